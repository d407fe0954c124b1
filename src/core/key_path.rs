use crate::core::path::Path;
use crate::core::segment::Segment;
use crate::core::value::{Container, Key};
use serde_yaml::Value;
use std::fmt;

/// A fully resolved, absolute location of one node.
///
/// Unlike a [`Path`], a key path names exactly one slot: every step is a
/// concrete key. Ordering is lexicographic over the keys, which puts deeper
/// and later siblings after their predecessors.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPath(Vec<Key>);

impl KeyPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_keys(keys: Vec<Key>) -> Self {
        Self(keys)
    }

    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, key: Key) {
        self.0.push(key);
    }

    /// A new key path with `key` appended
    pub fn child(&self, key: Key) -> Self {
        let mut keys = self.0.clone();
        keys.push(key);
        Self(keys)
    }

    /// Split off the last key, `None` for the root
    pub fn split_last(&self) -> Option<(KeyPath, &Key)> {
        let (last, parent) = self.0.split_last()?;
        Some((Self(parent.to_vec()), last))
    }

    /// Whether `self` is `other` or one of its ancestors
    pub fn is_prefix_of(&self, other: &KeyPath) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Follow the keys exactly
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.0.iter().try_fold(root, |node, key| node.child(key))
    }

    /// Follow the keys exactly, mutably
    pub fn resolve_mut<'a>(&self, root: &'a mut Value) -> Option<&'a mut Value> {
        self.0.iter().try_fold(root, |node, key| node.child_mut(key))
    }

    /// The literal path addressing this location
    pub fn to_path(&self) -> Path {
        Path::from_segments(
            self.0
                .iter()
                .map(|key| Segment::literal(key.to_string()))
                .collect(),
        )
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_path().as_str())
    }
}

impl From<Vec<Key>> for KeyPath {
    fn from(keys: Vec<Key>) -> Self {
        Self(keys)
    }
}

impl FromIterator<Key> for KeyPath {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
