//! Whole-container operations that do not take a path
//!
//! `merge` follows array-merge semantics rather than array-replace: entries
//! under integer keys are appended, string keys are overwritten, and shared
//! keys holding two containers merge recursively.

use crate::core::compare::{as_number, loose_eq};
use crate::core::value::{is_empty_container, scalar_string, untag, untag_mut, Container, Key};
use log::{debug, trace};
use serde_yaml::{Mapping, Value};

/// Separator used by the CLI and convenience helpers when none is given
pub const DEFAULT_SEPARATOR: &str = ".";

/// Collapse a nested container into a single-level map
///
/// Keys are the separator-joined keys leading to each leaf; leaves are
/// scalars and empty containers. A scalar root has no keys to flatten and
/// yields an empty map.
pub fn flatten(container: &Value, separator: &str) -> Mapping {
    let mut flat = Mapping::new();
    if container.is_scalar() {
        debug!("flatten: root is a scalar, nothing to flatten");
        return flat;
    }
    flatten_into(container, None, separator, &mut flat);
    flat
}

fn flatten_into(node: &Value, prefix: Option<&str>, separator: &str, flat: &mut Mapping) {
    for (key, child) in node.children() {
        let joined = match prefix {
            Some(prefix) => format!("{}{}{}", prefix, separator, key),
            None => key.to_string(),
        };
        if child.is_scalar() || is_empty_container(child) {
            flat.insert(Value::String(joined), child.clone());
        } else {
            flatten_into(child, Some(&joined), separator, flat);
        }
    }
}

/// Rebuild a nested container from a flat map produced by [`flatten`]
///
/// Integer-looking key parts become integer keys, and a map whose keys are
/// exactly `0..n-1` in order becomes a list.
pub fn expand(flat: &Mapping, separator: &str) -> Value {
    let mut root = Value::Mapping(Mapping::new());
    for (flat_key, value) in flat {
        let Some(text) = scalar_string(flat_key) else {
            debug!("expand: skipping non-scalar key");
            continue;
        };
        let keys: Vec<Key> = if separator.is_empty() {
            vec![Key::parse(&text)]
        } else {
            text.split(separator).map(Key::parse).collect()
        };
        assign(&mut root, &keys, value.clone());
    }
    listify(&mut root);
    root
}

fn assign(node: &mut Value, keys: &[Key], value: Value) {
    let Some((key, rest)) = keys.split_first() else {
        *node = value;
        return;
    };
    if !node.is_map() {
        *node = Value::Mapping(Mapping::new());
    }
    if node.child(key).is_none() {
        node.set_child(key.clone(), Value::Mapping(Mapping::new()));
    }
    if let Some(child) = node.child_mut(key) {
        assign(child, rest, value);
    }
}

/// Turn every non-empty map keyed exactly `0..n-1` into a list, bottom-up
fn listify(node: &mut Value) {
    let items = match untag_mut(node) {
        Value::Sequence(seq) => {
            seq.iter_mut().for_each(listify);
            None
        }
        Value::Mapping(map) => {
            map.values_mut().for_each(listify);
            let sequential = !map.is_empty()
                && map
                    .keys()
                    .enumerate()
                    .all(|(i, key)| Key::from_value(key) == Key::Index(i as i64));
            sequential.then(|| std::mem::take(map).into_iter().map(|(_, v)| v).collect())
        }
        _ => None,
    };
    if let Some(items) = items {
        *node = Value::Sequence(items);
    }
}

/// Deep-merge any number of containers, later ones winning
pub fn merge<'a, I>(values: I) -> Value
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut values = values.into_iter();
    let Some(first) = values.next() else {
        return Value::Mapping(Mapping::new());
    };
    let mut merged = first.clone();
    for value in values {
        merge_into(&mut merged, value);
    }
    merged
}

/// Deep-merge two containers
pub fn merge_pair(a: &Value, b: &Value) -> Value {
    let mut merged = a.clone();
    merge_into(&mut merged, b);
    merged
}

fn merge_into(target: &mut Value, source: &Value) {
    if target.is_scalar() || source.is_scalar() {
        *target = source.clone();
        return;
    }

    for (key, value) in source.children() {
        let existing = target.child(&key);
        let recurse = existing.map_or(false, |e| !e.is_scalar() && !is_empty_container(e))
            && !value.is_scalar();
        let occupied_index = matches!(key, Key::Index(_)) && existing.is_some();

        if recurse {
            if let Some(slot) = target.child_mut(&key) {
                merge_into(slot, value);
            }
        } else if occupied_index {
            append(target, value.clone());
        } else {
            put(target, key, value.clone());
        }
    }
}

/// Add `value` at the next free integer key
fn append(target: &mut Value, value: Value) {
    match untag_mut(target) {
        Value::Sequence(seq) => seq.push(value),
        Value::Mapping(map) => {
            let next = map
                .keys()
                .filter_map(|k| match Key::from_value(k) {
                    Key::Index(i) => Some(i + 1),
                    Key::Name(_) => None,
                })
                .max()
                .unwrap_or(0)
                .max(0);
            map.insert(Value::Number(next.into()), value);
        }
        _ => {}
    }
}

/// Store `value` under `key`, turning a list into a map when the key cannot
/// be a list position
fn put(target: &mut Value, key: Key, value: Value) {
    if target.set_child(key.clone(), value.clone()) {
        return;
    }
    if target.is_list() {
        trace!("converting list to map to hold key `{}`", key);
        list_to_map(target);
        target.set_child(key, value);
    }
}

fn list_to_map(node: &mut Value) {
    let target = untag_mut(node);
    if let Value::Sequence(seq) = target {
        let map: Mapping = std::mem::take(seq)
            .into_iter()
            .enumerate()
            .map(|(i, v)| (Value::Number((i as i64).into()), v))
            .collect();
        *target = Value::Mapping(map);
    }
}

/// Add the keys of `b` missing from `a`, recursing where both hold containers
pub fn merge_diff(a: &Value, b: &Value) -> Value {
    let mut merged = a.clone();
    merge_diff_into(&mut merged, b);
    merged
}

fn merge_diff_into(target: &mut Value, source: &Value) {
    if target.is_scalar() {
        return;
    }
    for (key, value) in source.children() {
        match target.child_mut(&key) {
            None => put(target, key, value.clone()),
            Some(existing) if !existing.is_scalar() && !value.is_scalar() => {
                merge_diff_into(existing, value)
            }
            Some(_) => {}
        }
    }
}

/// Key-wise difference of two containers
///
/// Entries of `a` whose key is absent from `b` or whose value differs, then
/// entries of `b` whose key is absent from `a`. Only the top level is
/// compared; values compare with the loose equality rule.
pub fn diff(a: &Value, b: &Value) -> Value {
    let mut result = Mapping::new();
    for (key, value) in a.children() {
        let same = b.child(&key).map_or(false, |other| loose_eq(value, other));
        if !same {
            result.insert(key.to_value(), value.clone());
        }
    }
    for (key, value) in b.children() {
        if a.child(&key).is_none() {
            result.insert(key.to_value(), value.clone());
        }
    }
    Value::Mapping(result)
}

/// Whether every key path of `needle` is in `haystack` with an equal value
///
/// An empty needle is contained in everything.
pub fn contains(haystack: &Value, needle: &Value) -> bool {
    if needle.is_scalar() {
        return loose_eq(haystack, needle);
    }
    if haystack.is_scalar() {
        return false;
    }
    needle.children().all(|(key, wanted)| match haystack.child(&key) {
        Some(found) if wanted.is_scalar() => loose_eq(found, wanted),
        Some(found) => contains(found, wanted),
        None => false,
    })
}

/// Recursively drop null, `""`, `false` and empty containers
///
/// `0` and `"0"` are kept. Lists close the gaps left by dropped entries.
pub fn filter(container: &Value) -> Value {
    match untag(container) {
        Value::Mapping(map) => Value::Mapping(
            map.iter()
                .map(|(k, v)| (k.clone(), filter(v)))
                .filter(|(_, v)| keep(v))
                .collect(),
        ),
        Value::Sequence(seq) => Value::Sequence(seq.iter().map(filter).filter(keep).collect()),
        _ => container.clone(),
    }
}

fn keep(value: &Value) -> bool {
    match untag(value) {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        other => !is_empty_container(other),
    }
}

/// Depth found by following the first child of each level
pub fn dimensions(container: &Value) -> usize {
    if container.is_scalar() || is_empty_container(container) {
        return 0;
    }
    let mut depth = 1;
    let mut node = container;
    while let Some((_, first)) = node.children().next() {
        if first.is_scalar() || is_empty_container(first) {
            break;
        }
        depth += 1;
        node = first;
    }
    depth
}

/// Deepest nesting level anywhere in the container
pub fn max_dimensions(container: &Value) -> usize {
    container
        .children()
        .map(|(_, child)| {
            if child.is_scalar() {
                1
            } else {
                max_dimensions(child) + 1
            }
        })
        .max()
        .unwrap_or(0)
}

/// Whether the container is non-empty and every top-level value is numeric
pub fn numeric(container: &Value) -> bool {
    let mut children = container.children().peekable();
    children.peek().is_some()
        && children.all(|(_, child)| {
            scalar_string(child)
                .as_deref()
                .and_then(as_number)
                .is_some()
        })
}
