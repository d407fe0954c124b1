//! Read-only traversal: `get`, `extract`, `locate` and `check`
//!
//! Extraction keeps a rolling set of match contexts, starting with a single
//! context wrapping the root. Each segment expands every context into the
//! children whose key it selects, then filters the candidates through the
//! segment's predicates. Positional predicates see the whole candidate list of
//! the step, across all contexts, in first-seen order.

use crate::core::key_path::KeyPath;
use crate::core::path::Path;
use crate::core::segment::Segment;
use crate::core::value::{Container, Key};
use log::{debug, trace};
use serde_yaml::Value;
use std::collections::HashSet;

/// A node matched by a path, with its resolved location
#[derive(Debug, Clone, PartialEq)]
pub struct Match<'a> {
    pub path: KeyPath,
    pub value: &'a Value,
}

/// Per-candidate bookkeeping during one extraction
#[derive(Debug, Clone)]
struct MatchContext<'a> {
    /// Keys from the root down to `item`
    trace: Vec<Key>,
    /// Nodes holding each key of `trace`, root first
    ancestors: Vec<&'a Value>,
    item: &'a Value,
}

impl<'a> MatchContext<'a> {
    fn root(item: &'a Value) -> Self {
        Self {
            trace: Vec::new(),
            ancestors: Vec::new(),
            item,
        }
    }

    fn descend(&self, key: Key, item: &'a Value) -> Self {
        let mut trace = self.trace.clone();
        trace.push(key);
        let mut ancestors = self.ancestors.clone();
        ancestors.push(self.item);
        Self {
            trace,
            ancestors,
            item,
        }
    }

    /// Step back to the node holding `item`; the root has no parent
    fn ascend(mut self) -> Option<Self> {
        let parent = self.ancestors.pop()?;
        self.trace.pop();
        self.item = parent;
        Some(self)
    }
}

/// Fast literal lookup
///
/// Walks key by key and returns `None` on a missing key, on indexing into a
/// scalar, or when the path has a wildcard, predicate or parent segment.
pub fn get<'a>(container: &'a Value, path: &Path) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(container, |node, segment| {
            if !segment.is_plain() {
                debug!("get: `{}` is not a literal segment", segment);
                return None;
            }
            node.literal_child(segment.as_literal()?)
        })
}

/// Every node matched by `path`, in first-seen order
pub fn extract<'a>(container: &'a Value, path: &Path) -> Vec<&'a Value> {
    walk(container, path.segments())
        .into_iter()
        .map(|context| context.item)
        .collect()
}

/// Every node matched by `path`, with the key path it was found at
pub fn locate<'a>(container: &'a Value, path: &Path) -> Vec<Match<'a>> {
    locate_segments(container, path.segments())
}

/// Whether `path` matches at least one node
pub fn check(container: &Value, path: &Path) -> bool {
    !walk(container, path.segments()).is_empty()
}

pub(crate) fn locate_segments<'a>(container: &'a Value, segments: &[Segment]) -> Vec<Match<'a>> {
    walk(container, segments)
        .into_iter()
        .map(|context| Match {
            path: KeyPath::from_keys(context.trace),
            value: context.item,
        })
        .collect()
}

fn walk<'a>(container: &'a Value, segments: &[Segment]) -> Vec<MatchContext<'a>> {
    let mut contexts = vec![MatchContext::root(container)];

    for segment in segments {
        if contexts.is_empty() {
            break;
        }

        if segment.is_parent() {
            contexts = ascend_all(contexts);
            trace!("`..` leaves {} contexts", contexts.len());
            continue;
        }

        let candidates: Vec<MatchContext<'a>> = contexts
            .iter()
            .flat_map(|context| {
                context
                    .item
                    .children()
                    .filter(|(key, _)| segment.matches_key(key))
                    .map(move |(key, child)| context.descend(key, child))
            })
            .collect();

        let total = candidates.len();
        contexts = candidates
            .into_iter()
            .enumerate()
            .filter(|(i, candidate)| segment.accepts(candidate.item, i + 1, total))
            .map(|(_, candidate)| candidate)
            .collect();

        trace!(
            "segment `{}`: {} candidates, {} kept",
            segment,
            total,
            contexts.len()
        );
    }

    contexts
}

/// Ascend every context, dropping those at the root and collapsing siblings
/// that arrive at the same parent
fn ascend_all(contexts: Vec<MatchContext<'_>>) -> Vec<MatchContext<'_>> {
    let mut seen = HashSet::new();
    contexts
        .into_iter()
        .filter_map(MatchContext::ascend)
        .filter(|context| seen.insert(context.trace.clone()))
        .collect()
}
