//! Conversions between the YAML container model and `serde_json`

use crate::error::{HashPathError, Result};
use serde_json::Value as JsonValue;
use serde_yaml::Value;

/// Convert a container to JSON
///
/// Tags are dropped. Map keys must be scalars; non-finite floats have no JSON
/// form and are an error.
pub fn to_json(value: &Value) -> Result<JsonValue> {
    match value {
        Value::Null => Ok(JsonValue::Null),
        Value::Bool(b) => Ok(JsonValue::Bool(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(JsonValue::Number(i.into()))
            } else if let Some(u) = n.as_u64() {
                Ok(JsonValue::Number(u.into()))
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(JsonValue::Number)
                    .ok_or_else(|| HashPathError::type_conversion(format!("YAML number {}", n), "JSON number"))
            }
        }
        Value::String(s) => Ok(JsonValue::String(s.clone())),
        Value::Sequence(seq) => Ok(JsonValue::Array(
            seq.iter().map(to_json).collect::<Result<Vec<_>>>()?,
        )),
        Value::Mapping(map) => {
            let mut object = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    Value::Null => String::new(),
                    _ => {
                        return Err(HashPathError::type_conversion(
                            format!("YAML key {:?}", k),
                            "JSON string key",
                        ))
                    }
                };
                object.insert(key, to_json(v)?);
            }
            Ok(JsonValue::Object(object))
        }
        Value::Tagged(tagged) => to_json(&tagged.value),
    }
}

/// Convert JSON into a container
pub fn from_json(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                Value::Number(n.as_f64().unwrap_or_default().into())
            }
        }
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Array(items) => Value::Sequence(items.iter().map(from_json).collect()),
        JsonValue::Object(object) => Value::Mapping(
            object
                .iter()
                .map(|(k, v)| (Value::String(k.clone()), from_json(v)))
                .collect(),
        ),
    }
}
