//! Bookkeeping for the path-keyed [`VariableBindingMap`].
//!
//! Binding keys are dotted paths into the schema tree, so structural edits
//! (delete, rename, retype, advanced-view replacement) have to be mirrored
//! here to keep the side table in step.

use super::path::{self, is_at_or_under, join};
use super::types::{ToolSchema, VariableBindingMap};

/// Remove the binding at `path` and every binding beneath it.
///
/// Returns the number of keys removed.
pub fn prune(bindings: &mut VariableBindingMap, path: &str) -> usize {
    let before = bindings.len();
    bindings.retain(|key, _| !is_at_or_under(key, path));
    before - bindings.len()
}

/// Remove bindings at or under `scope` whose path no longer resolves in
/// `schema`. `None` checks every key.
///
/// Returns the number of keys removed.
pub fn prune_unresolved(
    schema: &ToolSchema,
    bindings: &mut VariableBindingMap,
    scope: Option<&str>,
) -> usize {
    let before = bindings.len();
    bindings.retain(|key, _| {
        let in_scope = match scope {
            Some(scope) => is_at_or_under(key, scope),
            None => true,
        };
        !in_scope || path::node(schema, key).is_some()
    });
    before - bindings.len()
}

/// Move every binding at or under `old_path` to the same position under
/// `new_path`. Returns the number of keys moved.
pub fn rebase(bindings: &mut VariableBindingMap, old_path: &str, new_path: &str) -> usize {
    let moved: Vec<String> = bindings
        .keys()
        .filter(|key| is_at_or_under(key, old_path))
        .cloned()
        .collect();

    for key in &moved {
        if let Some(source) = bindings.remove(key) {
            let suffix = &key[old_path.len()..];
            bindings.insert(format!("{new_path}{suffix}"), source);
        }
    }
    moved.len()
}

/// Path of a renamed leaf: `a.b.old` -> `a.b.new`.
pub fn sibling_path(path: &str, new_name: &str) -> String {
    match path.rsplit_once('.') {
        Some((parent, _)) => join(parent, new_name),
        None => new_name.to_string(),
    }
}
