//! Structural edits to a [`ToolSchema`] addressed by dotted path.
//!
//! Every function works on an in-memory copy and performs no I/O. Functions
//! that can invalidate binding keys take the [`VariableBindingMap`] explicitly
//! and keep it consistent with the tree.
//!
//! Return conventions: `bool`/`Option` results report whether anything
//! changed (a path that does not resolve is a silent no-op), while
//! `Result` is reserved for input the user has to correct.

use serde_json::Value;
use tracing::debug;

use super::bindings;
use super::path::{self, Container};
use super::types::{EditorMode, ParamType, ParameterMap, ParameterNode, ToolSchema, VariableBindingMap};
use crate::error::EditError;

/// Lowest unused `new{N}` key in `children`.
pub fn next_parameter_name(children: &ParameterMap) -> String {
    (0..)
        .map(|i| format!("new{i}"))
        .find(|name| !children.contains_key(name))
        .unwrap_or_default()
}

fn insert_new_parameter(container: Container<'_>, mode: EditorMode) -> String {
    let name = next_parameter_name(container.children);
    container
        .children
        .insert(name.clone(), ParameterNode::new(ParamType::String));
    if mode.required_by_default() {
        container.required.push(name.clone());
    }
    name
}

/// Insert a fresh string parameter at the top level and return its name.
pub fn add_top_level_parameter(schema: &mut ToolSchema, mode: EditorMode) -> String {
    let container = Container {
        children: &mut schema.fields,
        required: &mut schema.required_params,
    };
    let name = insert_new_parameter(container, mode);
    debug!(name = %name, mode = %mode, "added top-level parameter");
    name
}

/// Insert a fresh string parameter under the object at `parent_path`.
///
/// If `parent_path` names an array, the child goes into its `items` node,
/// which must itself be an object. Returns `None` (and changes nothing) when
/// the parent does not resolve or cannot hold children.
pub fn add_child_parameter(
    schema: &mut ToolSchema,
    parent_path: &str,
    mode: EditorMode,
) -> Option<String> {
    let element = path::node_mut(schema, parent_path)?.element_mut()?;
    if element.param_type != ParamType::Object {
        return None;
    }
    let ParameterNode {
        parameter,
        required_params,
        ..
    } = element;
    let container = Container {
        children: parameter.get_or_insert_with(ParameterMap::new),
        required: required_params,
    };
    let name = insert_new_parameter(container, mode);
    debug!(parent = %parent_path, name = %name, "added child parameter");
    Some(path::join(parent_path, &name))
}

/// Remove the field at `path`, its required entry, and every binding at or
/// under `path`.
pub fn delete_parameter(
    schema: &mut ToolSchema,
    bindings: &mut VariableBindingMap,
    path: &str,
) -> bool {
    let Some(segs) = path::segments(path) else {
        return false;
    };
    let Some((leaf, ancestors)) = segs.split_last() else {
        return false;
    };
    let Some(container) = path::container_mut(schema, ancestors) else {
        return false;
    };
    if container.children.remove(*leaf).is_none() {
        return false;
    }
    container.required.retain(|name| name != leaf);

    let pruned = bindings::prune(bindings, path);
    debug!(path = %path, pruned_bindings = pruned, "deleted parameter");
    true
}

/// Rename the field at `path` to `new_name`.
///
/// The required entry follows the rename, and bindings at or under the old
/// path are moved to the new path. Returns `Ok(false)` when the name is
/// unchanged or the path does not resolve.
pub fn rename_parameter(
    schema: &mut ToolSchema,
    bindings: &mut VariableBindingMap,
    path: &str,
    new_name: &str,
) -> Result<bool, EditError> {
    let new_name = new_name.trim();
    if new_name.is_empty() {
        return Err(EditError::EmptyName);
    }
    let Some(segs) = path::segments(path) else {
        return Ok(false);
    };
    let Some((old_name, ancestors)) = segs.split_last() else {
        return Ok(false);
    };
    if *old_name == new_name {
        return Ok(false);
    }
    if new_name.contains('.') {
        return Err(EditError::InvalidName(new_name.to_string()));
    }

    let Some(container) = path::container_mut(schema, ancestors) else {
        return Ok(false);
    };
    if !container.children.contains_key(*old_name) {
        return Ok(false);
    }
    if container.children.contains_key(new_name) {
        return Err(EditError::NameTaken(new_name.to_string()));
    }

    if let Some(node) = container.children.remove(*old_name) {
        container.children.insert(new_name.to_string(), node);
    }
    for name in container.required.iter_mut() {
        if name == old_name {
            *name = new_name.to_string();
        }
    }

    let new_path = bindings::sibling_path(path, new_name);
    let moved = bindings::rebase(bindings, path, &new_path);
    debug!(from = %path, to = %new_path, moved_bindings = moved, "renamed parameter");
    Ok(true)
}

/// Toggle the field at `path` in its parent's required set.
///
/// Turning a field on does not check [`required_eligible`]; callers gate
/// that. Turning a field off also clears every required set beneath it, since
/// a descendant cannot stay required under an optional ancestor.
/// Returns the new requiredness, or `None` if the path does not resolve.
pub fn set_required(schema: &mut ToolSchema, path: &str) -> Option<bool> {
    let segs = path::segments(path)?;
    let (leaf, ancestors) = segs.split_last()?;
    let container = path::container_mut(schema, ancestors)?;
    let node = container.children.get_mut(*leaf)?;

    if let Some(pos) = container.required.iter().position(|name| name == leaf) {
        container.required.remove(pos);
        clear_required_below(node);
        debug!(path = %path, "parameter no longer required");
        Some(false)
    } else {
        container.required.push(leaf.to_string());
        Some(true)
    }
}

fn clear_required_below(node: &mut ParameterNode) {
    let Some(element) = node.element_mut() else {
        return;
    };
    element.required_params.clear();
    if let Some(children) = element.parameter.as_mut() {
        children.values_mut().for_each(clear_required_below);
    }
}

/// Whether the field at `path` may have its requiredness toggled: every
/// ancestor must itself be required. Top-level fields are always eligible.
pub fn required_eligible(schema: &ToolSchema, path: &str) -> bool {
    let Some(segs) = path::segments(path) else {
        return false;
    };
    (1..segs.len()).all(|depth| path::is_required(schema, &segs[..depth].join(".")))
}

/// Change the type of the field at `path`. See [`ParameterNode::retype`] for
/// the transition rules.
///
/// Bindings under `path` that pointed into a dropped subtree are removed.
pub fn set_type(
    schema: &mut ToolSchema,
    bindings: &mut VariableBindingMap,
    path: &str,
    new_type: ParamType,
) -> bool {
    let Some(node) = path::node_mut(schema, path) else {
        return false;
    };
    if !node.retype(new_type) {
        return false;
    }
    let pruned = bindings::prune_unresolved(schema, bindings, Some(path));
    debug!(path = %path, new_type = %new_type, pruned_bindings = pruned, "changed parameter type");
    true
}

/// Change the element type of the array at `path`. Bindings into the old
/// elements are removed like in [`set_type`].
pub fn set_items_type(
    schema: &mut ToolSchema,
    bindings: &mut VariableBindingMap,
    path: &str,
    new_type: ParamType,
) -> bool {
    let Some(node) = path::node_mut(schema, path) else {
        return false;
    };
    if node.param_type != ParamType::Array {
        return false;
    }
    let changed = node
        .items
        .get_or_insert_with(|| Box::new(ParameterNode::new(ParamType::String)))
        .retype(new_type);
    if changed {
        bindings::prune_unresolved(schema, bindings, Some(path));
    }
    changed
}

/// Parse user-entered enum text.
///
/// Blank input yields an empty list. Otherwise single quotes are replaced by
/// double quotes and the result must be a JSON array literal.
pub fn parse_enum(raw: &str) -> Result<Vec<Value>, EditError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(&raw.replace('\'', "\"")) {
        Ok(Value::Array(values)) => Ok(values),
        _ => Err(EditError::InvalidEnum),
    }
}

/// Set or clear the enum of the scalar field at `path`.
///
/// `None` removes the `enum` key entirely. Invalid text is rejected before
/// the tree is touched. Objects and arrays take no enum; for them this is a
/// no-op.
pub fn set_enum(schema: &mut ToolSchema, path: &str, raw: Option<&str>) -> Result<bool, EditError> {
    let values = raw.map(parse_enum).transpose()?;
    let Some(node) = path::node_mut(schema, path) else {
        return Ok(false);
    };
    if !node.param_type.is_scalar() {
        return Ok(false);
    }
    let changed = node.enum_values != values;
    node.enum_values = values;
    Ok(changed)
}

pub fn set_description(schema: &mut ToolSchema, path: &str, text: &str) -> bool {
    match path::node_mut(schema, path) {
        Some(node) if node.description != text => {
            node.description = text.to_string();
            true
        }
        Some(_) => false,
        None => false,
    }
}

/// Bind the field at `path` to an external source expression. A path that
/// does not resolve is ignored.
pub fn set_binding(
    schema: &ToolSchema,
    bindings: &mut VariableBindingMap,
    path: &str,
    source: &str,
) -> bool {
    if path::node(schema, path).is_none() {
        return false;
    }
    bindings.insert(path.to_string(), source.to_string()) != Some(source.to_string())
}

pub fn remove_binding(bindings: &mut VariableBindingMap, path: &str) -> bool {
    bindings.remove(path).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> ToolSchema {
        ToolSchema::new("lookup")
    }

    #[test]
    fn pre_tool_fields_are_required_by_default() {
        let mut s = schema();
        let name = add_top_level_parameter(&mut s, EditorMode::PreTool);
        assert_eq!(s.required_params, vec![name]);

        let mut s = schema();
        add_top_level_parameter(&mut s, EditorMode::Tool);
        assert!(s.required_params.is_empty());
    }

    #[test]
    fn next_name_fills_gaps() {
        let mut s = schema();
        for _ in 0..3 {
            add_top_level_parameter(&mut s, EditorMode::Tool);
        }
        let mut bindings = VariableBindingMap::new();
        assert!(delete_parameter(&mut s, &mut bindings, "new1"));
        assert_eq!(add_top_level_parameter(&mut s, EditorMode::Tool), "new1");
        assert_eq!(add_top_level_parameter(&mut s, EditorMode::Tool), "new3");
    }

    #[test]
    fn add_child_to_scalar_is_noop() {
        let mut s = schema();
        add_top_level_parameter(&mut s, EditorMode::Tool);
        let before = s.clone();
        assert!(add_child_parameter(&mut s, "new0", EditorMode::Tool).is_none());
        assert_eq!(s, before);
    }

    #[test]
    fn add_child_initializes_missing_parameter_map() {
        let mut s = schema();
        let mut node = ParameterNode::new(ParamType::Object);
        node.parameter = None;
        s.fields.insert("obj".into(), node);

        assert_eq!(
            add_child_parameter(&mut s, "obj", EditorMode::Tool).as_deref(),
            Some("obj.new0")
        );
        assert!(s.fields["obj"].parameter.as_ref().unwrap().contains_key("new0"));
    }

    #[test]
    fn add_child_to_array_of_objects_uses_items() {
        let mut s = schema();
        add_top_level_parameter(&mut s, EditorMode::Tool);
        set_type(&mut s, &mut VariableBindingMap::new(), "new0", ParamType::Array);

        assert!(add_child_parameter(&mut s, "new0", EditorMode::Tool).is_none());

        assert!(set_items_type(&mut s, &mut VariableBindingMap::new(), "new0", ParamType::Object));
        let child = add_child_parameter(&mut s, "new0", EditorMode::Tool).unwrap();
        assert_eq!(child, "new0.new0");
        assert!(path::node(&s, &child).is_some());
        assert!(s.fields["new0"].parameter.is_none());
    }

    #[test]
    fn delete_drops_required_entry() {
        let mut s = schema();
        add_top_level_parameter(&mut s, EditorMode::PreTool);
        let mut bindings = VariableBindingMap::new();
        assert!(delete_parameter(&mut s, &mut bindings, "new0"));
        assert!(s.required_params.is_empty());
        assert!(!delete_parameter(&mut s, &mut bindings, "new0"));
    }

    #[test]
    fn rename_moves_required_and_bindings() {
        let mut s = schema();
        add_top_level_parameter(&mut s, EditorMode::Tool);
        set_type(&mut s, &mut VariableBindingMap::new(), "new0", ParamType::Object);
        add_child_parameter(&mut s, "new0", EditorMode::PreTool);
        let mut bindings = VariableBindingMap::new();
        bindings.insert("new0.new0".into(), "{{user.email}}".into());

        assert!(rename_parameter(&mut s, &mut bindings, "new0.new0", "email").unwrap());
        let obj = &s.fields["new0"];
        assert!(obj.parameter.as_ref().unwrap().contains_key("email"));
        assert_eq!(obj.required_params, vec!["email"]);
        assert_eq!(bindings["new0.email"], "{{user.email}}");
        assert!(!bindings.contains_key("new0.new0"));
    }

    #[test]
    fn rename_rejects_collisions_and_dots() {
        let mut s = schema();
        add_top_level_parameter(&mut s, EditorMode::Tool);
        add_top_level_parameter(&mut s, EditorMode::Tool);
        let mut bindings = VariableBindingMap::new();
        let before = s.clone();

        assert!(matches!(
            rename_parameter(&mut s, &mut bindings, "new0", "new1"),
            Err(EditError::NameTaken(_))
        ));
        assert!(matches!(
            rename_parameter(&mut s, &mut bindings, "new0", "a.b"),
            Err(EditError::InvalidName(_))
        ));
        assert_eq!(s, before);
    }

    #[test]
    fn rename_trims_whitespace() {
        let mut s = schema();
        add_top_level_parameter(&mut s, EditorMode::Tool);
        let mut bindings = VariableBindingMap::new();
        assert!(rename_parameter(&mut s, &mut bindings, "new0", "  city ").unwrap());
        assert!(s.fields.contains_key("city"));
    }

    #[test]
    fn set_required_toggles() {
        let mut s = schema();
        add_top_level_parameter(&mut s, EditorMode::Tool);
        assert_eq!(set_required(&mut s, "new0"), Some(true));
        assert_eq!(set_required(&mut s, "new0"), Some(false));
        assert_eq!(set_required(&mut s, "missing"), None);
        assert!(s.required_params.is_empty());
    }

    #[test]
    fn eligibility_requires_every_ancestor() {
        let mut s = schema();
        add_top_level_parameter(&mut s, EditorMode::Tool);
        set_type(&mut s, &mut VariableBindingMap::new(), "new0", ParamType::Object);
        add_child_parameter(&mut s, "new0", EditorMode::Tool);
        set_type(&mut s, &mut VariableBindingMap::new(), "new0.new0", ParamType::Object);
        add_child_parameter(&mut s, "new0.new0", EditorMode::Tool);

        assert!(required_eligible(&s, "new0"));
        assert!(!required_eligible(&s, "new0.new0"));

        set_required(&mut s, "new0");
        assert!(required_eligible(&s, "new0.new0"));
        assert!(!required_eligible(&s, "new0.new0.new0"));

        set_required(&mut s, "new0.new0");
        assert!(required_eligible(&s, "new0.new0.new0"));
    }

    #[test]
    fn parse_enum_accepts_single_quotes_and_blank() {
        assert_eq!(parse_enum("['a','b']").unwrap(), vec![json!("a"), json!("b")]);
        assert_eq!(parse_enum("[1, 2.5, true]").unwrap().len(), 3);
        assert!(parse_enum("   ").unwrap().is_empty());
        assert!(matches!(parse_enum("a, b"), Err(EditError::InvalidEnum)));
        assert!(matches!(parse_enum("{\"a\": 1}"), Err(EditError::InvalidEnum)));
    }

    #[test]
    fn binding_requires_resolvable_path() {
        let mut s = schema();
        add_top_level_parameter(&mut s, EditorMode::Tool);
        let mut bindings = VariableBindingMap::new();

        assert!(!set_binding(&s, &mut bindings, "ghost", "{{x}}"));
        assert!(set_binding(&s, &mut bindings, "new0", "{{x}}"));
        assert!(!set_binding(&s, &mut bindings, "new0", "{{x}}"));
        assert!(remove_binding(&mut bindings, "new0"));
        assert!(bindings.is_empty());
    }
}
