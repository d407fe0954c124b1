//! Path-addressed mutation: `insert` and `remove`
//!
//! Both operations resolve their targets with the read-only engine first and
//! only then mutate, by exact key path. Nothing is borrowed across the two
//! phases.

use crate::core::engine::locate_segments;
use crate::core::key_path::KeyPath;
use crate::core::path::Path;
use crate::core::segment::Segment;
use crate::core::value::{is_empty_container, Container, Key};
use log::{debug, trace};
use serde_yaml::{Mapping, Value};

/// Insert `value` at every slot `path` addresses and return the container
pub fn insert(mut container: Value, path: &Path, value: Value) -> Value {
    insert_in_place(&mut container, path, value);
    container
}

/// Insert `value` at every slot `path` addresses
///
/// The trailing run of plain literal segments is created when absent:
/// missing or scalar intermediates become empty maps and a list accepts its
/// next free index. Segments up to the last wildcard, predicate or parent
/// step fan out over existing matches only. Returns the number of slots
/// written.
pub fn insert_in_place(container: &mut Value, path: &Path, value: Value) -> usize {
    let segments = path.segments();
    let split = segments
        .iter()
        .rposition(|segment| !segment.is_plain())
        .map_or(0, |i| i + 1);
    let (query, literal_tail) = segments.split_at(split);

    let targets = target_paths(container, query);
    if targets.is_empty() {
        debug!("insert `{}`: nothing matches `{}`", path, Path::from_segments(query.to_vec()));
        return 0;
    }

    let mut written = 0;
    for target in targets {
        let Some(node) = target.resolve_mut(container) else {
            debug!("insert `{}`: `{}` vanished during fan-out", path, target);
            continue;
        };
        if create_path(node, literal_tail, value.clone()) {
            written += 1;
        } else {
            debug!("insert `{}`: slot under `{}` cannot exist", path, target);
        }
    }

    trace!("insert `{}` wrote {} slots", path, written);
    written
}

/// Remove every node `path` matches and return the container
pub fn remove(mut container: Value, path: &Path) -> Value {
    remove_in_place(&mut container, path);
    container
}

/// Remove every node `path` matches from its parent
///
/// Lists close the gap. A map or list emptied by a removal is removed from
/// its own parent in turn, up to but excluding the root. The root path and
/// paths matching nothing are no-ops. Returns the number of matched nodes
/// removed.
pub fn remove_in_place(container: &mut Value, path: &Path) -> usize {
    let mut targets = target_paths(container, path.segments());
    targets.retain(|target| !target.is_empty());
    if targets.is_empty() {
        debug!("remove `{}`: no-op", path);
        return 0;
    }

    // Later siblings and deeper nodes first, so pending list indexes stay valid.
    targets.sort_unstable_by(|a, b| b.cmp(a));
    targets.dedup();

    let mut removed = 0;
    for target in &targets {
        if detach(container, target) {
            removed += 1;
            prune_emptied(container, target);
        }
    }

    trace!("remove `{}` removed {} nodes", path, removed);
    removed
}

fn target_paths(container: &Value, segments: &[Segment]) -> Vec<KeyPath> {
    locate_segments(container, segments)
        .into_iter()
        .map(|m| m.path)
        .collect()
}

/// Walk `tail` below `node`, creating what is missing, and store `value`
fn create_path(node: &mut Value, tail: &[Segment], value: Value) -> bool {
    let Some((segment, rest)) = tail.split_first() else {
        *node = value;
        return true;
    };
    let Some(literal) = segment.as_literal() else {
        return false;
    };

    if node.is_scalar() {
        *node = Value::Mapping(Mapping::new());
    }

    let key = node
        .children()
        .find(|(key, _)| key.matches_literal(literal))
        .map(|(key, _)| key)
        .unwrap_or_else(|| Key::parse(literal));

    if rest.is_empty() {
        return node.set_child(key, value);
    }

    if node.child(&key).is_none() && !node.set_child(key.clone(), Value::Mapping(Mapping::new())) {
        return false;
    }

    match node.child_mut(&key) {
        Some(child) => create_path(child, rest, value),
        None => false,
    }
}

fn detach(container: &mut Value, target: &KeyPath) -> bool {
    let Some((parent, key)) = target.split_last() else {
        return false;
    };
    parent
        .resolve_mut(container)
        .and_then(|node| node.remove_child(key))
        .is_some()
}

fn prune_emptied(container: &mut Value, removed: &KeyPath) {
    let mut current = removed.split_last().map(|(parent, _)| parent);
    while let Some(parent) = current {
        if parent.is_empty() {
            break;
        }
        let emptied = parent
            .resolve(container)
            .map(is_empty_container)
            .unwrap_or(false);
        if !emptied || !detach(container, &parent) {
            break;
        }
        trace!("pruned emptied `{}`", parent);
        current = parent.split_last().map(|(grandparent, _)| grandparent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    fn path(s: &str) -> Path {
        Path::compile(s).unwrap()
    }

    #[test]
    fn test_insert_creates_intermediate_maps() {
        let data = insert(yaml("{}"), &path("User.profile.name"), yaml("Bob"));
        assert_eq!(data, yaml("{User: {profile: {name: Bob}}}"));
    }

    #[test]
    fn test_insert_overwrites_existing() {
        let data = insert(yaml("{a: {b: 1, c: 2}}"), &path("a.b"), yaml("9"));
        assert_eq!(data, yaml("{a: {b: 9, c: 2}}"));
    }

    #[test]
    fn test_insert_replaces_scalar_intermediate() {
        let data = insert(yaml("{a: 5}"), &path("a.b"), yaml("1"));
        assert_eq!(data, yaml("{a: {b: 1}}"));
    }

    #[test]
    fn test_insert_into_lists() {
        let data = insert(yaml("{l: [x, y]}"), &path("l.2"), yaml("z"));
        assert_eq!(data, yaml("{l: [x, y, z]}"));

        let data = insert(yaml("{l: [x, y]}"), &path("l.0"), yaml("w"));
        assert_eq!(data, yaml("{l: [w, y]}"));

        let untouched = yaml("{l: [x, y]}");
        assert_eq!(insert(untouched.clone(), &path("l.7"), yaml("z")), untouched);
        assert_eq!(insert(untouched.clone(), &path("l.name"), yaml("z")), untouched);
    }

    #[test]
    fn test_insert_numeric_literal_reuses_existing_key() {
        let data = insert(yaml("{'3': old}"), &path("3"), yaml("new"));
        assert_eq!(data, yaml("{'3': new}"));

        let data = insert(yaml("{}"), &path("3"), yaml("new"));
        assert_eq!(data, yaml("{3: new}"));
    }

    #[test]
    fn test_insert_fans_out_over_wildcards() {
        let data = yaml("[{name: a}, {name: b}]");
        let data = insert(data, &path("{n}.active"), yaml("true"));
        assert_eq!(data, yaml("[{name: a, active: true}, {name: b, active: true}]"));
    }

    #[test]
    fn test_insert_with_predicate_only_touches_matches() {
        let data = yaml("[{id: 1}, {id: 2}]");
        let data = insert(data, &path("{n}[id=2].seen"), yaml("yes"));
        assert_eq!(data, yaml("[{id: 1}, {id: 2, seen: yes}]"));
    }

    #[test]
    fn test_insert_wildcard_does_not_create() {
        let data = yaml("{a: {}}");
        assert_eq!(insert(data.clone(), &path("a.{n}.x"), yaml("1")), data);
    }

    #[test]
    fn test_insert_terminal_query_overwrites_matches() {
        let data = yaml("{list: [1, 5, 10]}");
        let data = insert(data, &path("list.{n}"), yaml("0"));
        assert_eq!(data, yaml("{list: [0, 0, 0]}"));
    }

    #[test]
    fn test_insert_after_parent_step() {
        let data = yaml("{users: [{name: bob, role: {admin: true}}, {name: al, role: {admin: false}}]}");
        let data = insert(data, &path("users.{n}.role[admin=true]..flag"), yaml("1"));
        assert_eq!(
            data,
            yaml("{users: [{name: bob, role: {admin: true}, flag: 1}, {name: al, role: {admin: false}}]}")
        );
    }

    #[test]
    fn test_insert_root_replaces() {
        assert_eq!(insert(yaml("{a: 1}"), &path(""), yaml("[1]")), yaml("[1]"));
    }

    #[test]
    fn test_insert_is_idempotent() {
        for (doc, p) in [
            ("{}", "a.b.c"),
            ("{l: [1]}", "l.1"),
            ("[{x: 1}, {x: 2}]", "{n}.y"),
            ("{a: 5}", "a.b"),
        ] {
            let once = insert(yaml(doc), &path(p), yaml("v"));
            let twice = insert(once.clone(), &path(p), yaml("v"));
            assert_eq!(once, twice, "{} / {}", doc, p);
        }
    }

    #[test]
    fn test_insert_in_place_counts_writes() {
        let mut data = yaml("[{a: 1}, {a: 2}, 3]");
        assert_eq!(insert_in_place(&mut data, &path("{n}.b"), yaml("x")), 3);
        assert_eq!(data, yaml("[{a: 1, b: x}, {a: 2, b: x}, {b: x}]"));
    }

    #[test]
    fn test_remove_literal() {
        let data = remove(yaml("{a: 1, b: 2}"), &path("a"));
        assert_eq!(data, yaml("{b: 2}"));
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let data = yaml("{a: {b: 1}}");
        assert_eq!(remove(data.clone(), &path("a.c")), data);
        assert_eq!(remove(data.clone(), &path("x.y.z")), data);
        assert_eq!(remove(data.clone(), &path("")), data);
        assert_eq!(remove(data.clone(), &path("a.b.c")), data);
    }

    #[test]
    fn test_remove_from_list_closes_gap() {
        let data = remove(yaml("[a, b, c]"), &path("1"));
        assert_eq!(data, yaml("[a, c]"));
    }

    #[test]
    fn test_remove_fans_out() {
        let data = yaml("[{id: 1, tmp: x}, {id: 2, tmp: y}, {id: 3}]");
        let data = remove(data, &path("{n}.tmp"));
        assert_eq!(data, yaml("[{id: 1}, {id: 2}, {id: 3}]"));
    }

    #[test]
    fn test_remove_multiple_list_entries() {
        let data = yaml("{items: [{id: 1}, {id: 2}, {id: 3}, {id: 4}]}");
        let data = remove(data, &path("items.{n}[id>1][id<4]"));
        assert_eq!(data, yaml("{items: [{id: 1}, {id: 4}]}"));
    }

    #[test]
    fn test_remove_prunes_emptied_containers() {
        let data = remove(yaml("{a: {b: {c: 1}}, d: 2}"), &path("a.b.c"));
        assert_eq!(data, yaml("{d: 2}"));

        let data = remove(yaml("{a: {b: 1, c: 2}}"), &path("a.b"));
        assert_eq!(data, yaml("{a: {c: 2}}"));

        let data = remove(yaml("{a: 1}"), &path("a"));
        assert_eq!(data, yaml("{}"));
    }

    #[test]
    fn test_remove_through_parent_step() {
        let data = yaml("[{user: {banned: true}, post: 1}, {user: {banned: false}, post: 2}]");
        let data = remove(data, &path("{n}.user[banned=true].."));
        assert_eq!(data, yaml("[{user: {banned: false}, post: 2}]"));
    }

    #[test]
    fn test_remove_prunes_preexisting_empty_parent() {
        let data = insert(yaml("{a: {}}"), &path("a.b"), Value::from(1));
        assert_eq!(data, yaml("{a: {b: 1}}"));
        assert_eq!(remove(data, &path("a.b")), yaml("{}"));

        let data = insert(yaml("{a: {}, c: 2}"), &path("a.b.d"), Value::from(1));
        assert_eq!(remove(data, &path("a.b.d")), yaml("{c: 2}"));
    }

    #[test]
    fn test_remove_undoes_fresh_insert() {
        for (doc, p) in [
            ("{a: 1}", "b.c.d"),
            ("{l: [1, 2]}", "l.2"),
            ("{a: {x: 1}}", "a.y"),
            ("{}", "k"),
        ] {
            let original = yaml(doc);
            let inserted = insert(original.clone(), &path(p), yaml("v"));
            assert_eq!(remove(inserted, &path(p)), original, "{} / {}", doc, p);
        }
    }
}
