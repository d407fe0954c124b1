//! Building a keyed map out of parallel extractions

use crate::core::engine::extract;
use crate::core::path::Path;
use crate::core::value::{scalar_string, Container, Key};
use crate::error::{HashPathError, Result};
use log::debug;
use serde_yaml::{Mapping, Value};

/// Build a map from the values found by three parallel paths
///
/// The n-th match of `key_path` becomes the key of the n-th match of
/// `value_path` (null when no value path is given). With a `group_path`,
/// entries are nested under the rendering of the n-th group match. The
/// extractions must have the same length. Keys that are not scalars are an
/// error.
pub fn combine(
    container: &Value,
    key_path: &Path,
    value_path: Option<&Path>,
    group_path: Option<&Path>,
) -> Result<Value> {
    let keys = extract(container, key_path);
    if keys.is_empty() {
        debug!("combine: `{}` matches nothing", key_path);
        return Ok(Value::Mapping(Mapping::new()));
    }

    let values: Vec<Value> = match value_path {
        Some(path) => extract(container, path).into_iter().cloned().collect(),
        None => vec![Value::Null; keys.len()],
    };
    ensure_same_length(key_path, keys.len(), value_path, values.len())?;

    let groups = match group_path {
        Some(path) => {
            let groups = extract(container, path);
            ensure_same_length(key_path, keys.len(), Some(path), groups.len())?;
            Some(groups)
        }
        None => None,
    };

    let mut combined = Value::Mapping(Mapping::new());
    for (i, (key, value)) in keys.iter().zip(values).enumerate() {
        let key = render_key(key)?;
        match &groups {
            Some(groups) => {
                let group = render_key(groups[i])?;
                if combined.child(&group).is_none() {
                    combined.set_child(group.clone(), Value::Mapping(Mapping::new()));
                }
                if let Some(bucket) = combined.child_mut(&group) {
                    bucket.set_child(key, value);
                }
            }
            None => {
                combined.set_child(key, value);
            }
        }
    }
    Ok(combined)
}

fn render_key(value: &Value) -> Result<Key> {
    scalar_string(value)
        .map(|text| Key::parse(&text))
        .ok_or_else(|| HashPathError::validation("combine keys must be scalars"))
}

fn ensure_same_length(
    key_path: &Path,
    key_count: usize,
    other_path: Option<&Path>,
    other_count: usize,
) -> Result<()> {
    if key_count == other_count {
        return Ok(());
    }
    Err(HashPathError::validation(format!(
        "`{}` matched {} values but `{}` matched {}",
        key_path,
        key_count,
        other_path.map(Path::as_str).unwrap_or_default(),
        other_count
    )))
}
