//! Container model the path engine traverses
//!
//! The engine works on [`serde_yaml::Value`] and sees it through the narrow
//! [`Container`] capability interface: discrimination between maps, lists and
//! scalars, keyed child access, and a canonical scalar rendering used by
//! predicates. Tagged values are always seen through to their inner value.

use crate::error::{HashPathError, Result};
use serde_yaml::{Mapping, Value};
use std::fmt;

/// The key of a child as seen by the engine
///
/// List positions and integer map keys are both `Index`; every other map key
/// is a `Name` carrying its scalar rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Index(i64),
    Name(String),
}

impl Key {
    /// Build the key for a mapping key value
    pub fn from_value(key: &Value) -> Self {
        match untag(key) {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Index(i),
                None => Self::Name(n.to_string()),
            },
            other => Self::Name(scalar_string(other).unwrap_or_default()),
        }
    }

    /// Parse a textual key, turning canonical integers into `Index`
    ///
    /// `"7"` becomes `Index(7)`, while `"07"` stays `Name("07")` so the
    /// original spelling survives a round trip.
    pub fn parse(text: &str) -> Self {
        match text.parse::<i64>() {
            Ok(i) if i.to_string() == text => Self::Index(i),
            _ => Self::Name(text.to_string()),
        }
    }

    /// The mapping key value this key is stored under when inserted
    pub fn to_value(&self) -> Value {
        match self {
            Self::Index(i) => Value::Number((*i).into()),
            Self::Name(s) => Value::String(s.clone()),
        }
    }

    /// Integer value of the key, for indexes and names that parse fully as integers
    pub fn as_index(&self) -> Option<i64> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Name(s) => s.parse().ok(),
        }
    }

    /// Whether the key is an index or a purely numeric name
    pub fn is_numeric(&self) -> bool {
        self.as_index().is_some()
    }

    /// Compare against a literal path segment
    ///
    /// Numeric literals compare by value against numeric keys, so `"2"`
    /// matches both list position 2 and map key `2`. Everything else is exact
    /// string equality.
    pub fn matches_literal(&self, literal: &str) -> bool {
        match (literal.parse::<i64>(), self.as_index()) {
            (Ok(wanted), Some(actual)) => wanted == actual,
            _ => match self {
                Self::Name(s) => s == literal,
                Self::Index(i) => i.to_string() == literal,
            },
        }
    }

    /// Whether `key` is exactly the mapping key this `Key` was built from
    pub fn is_key_of(&self, key: &Value) -> bool {
        match (self, untag(key)) {
            (Self::Index(i), Value::Number(n)) => n.as_i64() == Some(*i),
            (Self::Index(_), _) => false,
            (Self::Name(s), Value::String(k)) => s == k,
            (Self::Name(s), other) => {
                !matches!(other, Value::Number(n) if n.as_i64().is_some())
                    && scalar_string(other).as_deref() == Some(s.as_str())
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{}", i),
            Self::Name(s) => write!(f, "{}", s),
        }
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Self::Index(index as i64)
    }
}

impl From<&str> for Key {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

/// Structural kind of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Map,
    List,
    Scalar,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Map => write!(f, "map"),
            Self::List => write!(f, "list"),
            Self::Scalar => write!(f, "scalar"),
        }
    }
}

/// Capability interface the engine needs from a nested value
pub trait Container {
    /// Discriminate maps, lists and scalars
    fn kind(&self) -> Kind;

    fn is_map(&self) -> bool {
        self.kind() == Kind::Map
    }

    fn is_list(&self) -> bool {
        self.kind() == Kind::List
    }

    fn is_scalar(&self) -> bool {
        self.kind() == Kind::Scalar
    }

    /// Iterate children with their keys, in order
    fn children(&self) -> Children<'_>;

    /// Child stored under exactly `key`
    fn child(&self, key: &Key) -> Option<&Value>;

    /// Mutable child stored under exactly `key`
    fn child_mut(&mut self, key: &Key) -> Option<&mut Value>;

    /// First child whose key matches a literal path segment
    fn literal_child(&self, literal: &str) -> Option<&Value>;

    /// Store `value` under `key`, replacing an existing child
    ///
    /// Lists accept existing positions and the next free one. Returns `false`
    /// when the slot cannot exist in this container.
    fn set_child(&mut self, key: Key, value: Value) -> bool;

    /// Detach the child stored under `key`; lists close the gap
    fn remove_child(&mut self, key: &Key) -> Option<Value>;

    /// Canonical rendering of a scalar, `None` for containers
    fn scalar_string(&self) -> Option<String>;
}

impl Container for Value {
    fn kind(&self) -> Kind {
        match untag(self) {
            Value::Mapping(_) => Kind::Map,
            Value::Sequence(_) => Kind::List,
            _ => Kind::Scalar,
        }
    }

    fn children(&self) -> Children<'_> {
        match untag(self) {
            Value::Mapping(map) => Children::Map(map.iter()),
            Value::Sequence(seq) => Children::List(seq.iter().enumerate()),
            _ => Children::Empty,
        }
    }

    fn child(&self, key: &Key) -> Option<&Value> {
        match untag(self) {
            Value::Mapping(map) => map.iter().find(|(k, _)| key.is_key_of(k)).map(|(_, v)| v),
            Value::Sequence(seq) => list_position(key, seq.len()).map(|i| &seq[i]),
            _ => None,
        }
    }

    fn child_mut(&mut self, key: &Key) -> Option<&mut Value> {
        match untag_mut(self) {
            Value::Mapping(map) => map
                .iter_mut()
                .find(|(k, _)| key.is_key_of(k))
                .map(|(_, v)| v),
            Value::Sequence(seq) => {
                let len = seq.len();
                list_position(key, len).map(move |i| &mut seq[i])
            }
            _ => None,
        }
    }

    fn literal_child(&self, literal: &str) -> Option<&Value> {
        self.children()
            .find(|(key, _)| key.matches_literal(literal))
            .map(|(_, v)| v)
    }

    fn set_child(&mut self, key: Key, value: Value) -> bool {
        match untag_mut(self) {
            Value::Mapping(map) => {
                if map.iter().any(|(k, _)| key.is_key_of(k)) {
                    for (k, slot) in map.iter_mut() {
                        if key.is_key_of(k) {
                            *slot = value;
                            break;
                        }
                    }
                } else {
                    map.insert(key.to_value(), value);
                }
                true
            }
            Value::Sequence(seq) => match key {
                Key::Index(i) if i >= 0 && (i as usize) < seq.len() => {
                    seq[i as usize] = value;
                    true
                }
                Key::Index(i) if i >= 0 && i as usize == seq.len() => {
                    seq.push(value);
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    fn remove_child(&mut self, key: &Key) -> Option<Value> {
        match untag_mut(self) {
            Value::Mapping(map) => {
                let mut removed = None;
                let kept: Mapping = std::mem::take(map)
                    .into_iter()
                    .filter_map(|(k, v)| {
                        if removed.is_none() && key.is_key_of(&k) {
                            removed = Some(v);
                            None
                        } else {
                            Some((k, v))
                        }
                    })
                    .collect();
                *map = kept;
                removed
            }
            Value::Sequence(seq) => list_position(key, seq.len()).map(|i| seq.remove(i)),
            _ => None,
        }
    }

    fn scalar_string(&self) -> Option<String> {
        scalar_string(self)
    }
}

/// Iterator over the keyed children of a value
pub enum Children<'a> {
    Map(serde_yaml::mapping::Iter<'a>),
    List(std::iter::Enumerate<std::slice::Iter<'a, Value>>),
    Empty,
}

impl<'a> Iterator for Children<'a> {
    type Item = (Key, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Map(iter) => iter.next().map(|(k, v)| (Key::from_value(k), v)),
            Self::List(iter) => iter.next().map(|(i, v)| (Key::from(i), v)),
            Self::Empty => None,
        }
    }
}

fn list_position(key: &Key, len: usize) -> Option<usize> {
    match key {
        Key::Index(i) if *i >= 0 && (*i as usize) < len => Some(*i as usize),
        _ => None,
    }
}

/// See through YAML tags
pub fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

/// See through YAML tags, mutably
pub fn untag_mut(value: &mut Value) -> &mut Value {
    match value {
        Value::Tagged(tagged) => untag_mut(&mut tagged.value),
        other => other,
    }
}

/// Canonical rendering of a scalar
///
/// Strings render as-is, numbers in their canonical form, booleans as
/// `true`/`false` and null as the empty string. Containers have no rendering.
pub fn scalar_string(value: &Value) -> Option<String> {
    match untag(value) {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

/// Whether a value is an empty map or list
pub fn is_empty_container(value: &Value) -> bool {
    match untag(value) {
        Value::Mapping(map) => map.is_empty(),
        Value::Sequence(seq) => seq.is_empty(),
        _ => false,
    }
}

/// Supported value types for CLI value conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Int,
    Float,
    Bool,
    /// Parse the raw text as a YAML document (lists, maps, ...)
    Yaml,
}

impl ValueType {
    /// Parse a `ValueType` from its string name (e.g. `"string"`, `"int"`, `"yaml"`)
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "string" | "str" => Some(Self::String),
            "int" | "integer" | "i64" => Some(Self::Int),
            "float" | "f64" | "number" => Some(Self::Float),
            "bool" | "boolean" => Some(Self::Bool),
            "yaml" | "json" | "object" | "array" => Some(Self::Yaml),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Bool => write!(f, "bool"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

/// Parse a raw string into a value, with an optional type hint
///
/// Without a hint, integers, floats and booleans are detected and anything
/// else is kept as a string.
pub fn parse_value(raw: &str, type_hint: Option<ValueType>) -> Result<Value> {
    let trimmed = raw.trim();

    match type_hint {
        Some(ValueType::String) => Ok(Value::String(raw.to_string())),
        Some(ValueType::Int) => {
            let i = trimmed
                .parse::<i64>()
                .map_err(|_| HashPathError::type_conversion(raw, "integer"))?;
            Ok(Value::Number(i.into()))
        }
        Some(ValueType::Float) => {
            let f = trimmed
                .parse::<f64>()
                .map_err(|_| HashPathError::type_conversion(raw, "float"))?;
            Ok(Value::Number(f.into()))
        }
        Some(ValueType::Bool) => {
            let b = match trimmed.to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => true,
                "false" | "no" | "off" | "0" => false,
                _ => return Err(HashPathError::type_conversion(raw, "boolean")),
            };
            Ok(Value::Bool(b))
        }
        Some(ValueType::Yaml) => Ok(serde_yaml::from_str(raw)?),
        None => {
            if let Ok(i) = trimmed.parse::<i64>() {
                Ok(Value::Number(i.into()))
            } else if let Ok(f) = trimmed.parse::<f64>() {
                Ok(Value::Number(f.into()))
            } else if let Ok(b) = trimmed.parse::<bool>() {
                Ok(Value::Bool(b))
            } else {
                Ok(Value::String(raw.to_string()))
            }
        }
    }
}
