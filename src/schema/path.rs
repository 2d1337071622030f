//! Dotted-path resolution through the parameter tree.
//!
//! A path like `a.b.c` is walked one segment at a time. Every intermediate
//! segment names a node; if that node is an array the walk steps into its
//! `items`, and the next segment is looked up in that node's `parameter`
//! map. The leaf segment names the field itself. All mutators resolve
//! through [`container_mut`] so the rule is applied in exactly one place.

use super::types::{ParameterMap, ParameterNode, ToolSchema};

/// Split a dotted path into its segments. Returns `None` for an empty path
/// or one with an empty segment (`"a..b"`, `".a"`).
pub fn segments(path: &str) -> Option<Vec<&str>> {
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts)
}

/// Join a parent path and a child name.
pub fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}

/// `true` if `candidate` is `path` itself or lies underneath it.
pub fn is_at_or_under(candidate: &str, path: &str) -> bool {
    candidate == path
        || candidate
            .strip_prefix(path)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// One level of the tree: a child map plus the required set governing it.
pub struct Container<'a> {
    pub children: &'a mut ParameterMap,
    pub required: &'a mut Vec<String>,
}

/// Read-only counterpart of [`Container`].
pub struct ContainerRef<'a> {
    pub children: &'a ParameterMap,
    pub required: &'a [String],
}

/// Resolve the container that holds the children of the node at `ancestors`.
///
/// An empty `ancestors` slice resolves to the schema's top level. Returns
/// `None` if any segment is missing or a node on the way has no children map.
pub fn container_mut<'a>(schema: &'a mut ToolSchema, ancestors: &[&str]) -> Option<Container<'a>> {
    descend_mut(&mut schema.fields, &mut schema.required_params, ancestors)
}

fn descend_mut<'a>(
    children: &'a mut ParameterMap,
    required: &'a mut Vec<String>,
    ancestors: &[&str],
) -> Option<Container<'a>> {
    let Some((first, rest)) = ancestors.split_first() else {
        return Some(Container { children, required });
    };
    let node = children.get_mut(*first)?.element_mut()?;
    let ParameterNode {
        parameter,
        required_params,
        ..
    } = node;
    descend_mut(parameter.as_mut()?, required_params, rest)
}

pub fn container<'a>(schema: &'a ToolSchema, ancestors: &[&str]) -> Option<ContainerRef<'a>> {
    let mut current = ContainerRef {
        children: &schema.fields,
        required: &schema.required_params,
    };
    for segment in ancestors {
        let node = current.children.get(*segment)?.element()?;
        current = ContainerRef {
            children: node.parameter.as_ref()?,
            required: &node.required_params,
        };
    }
    Some(current)
}

/// The node named by `path`.
pub fn node<'a>(schema: &'a ToolSchema, path: &str) -> Option<&'a ParameterNode> {
    let segs = segments(path)?;
    let (leaf, ancestors) = segs.split_last()?;
    container(schema, ancestors)?.children.get(*leaf)
}

pub fn node_mut<'a>(schema: &'a mut ToolSchema, path: &str) -> Option<&'a mut ParameterNode> {
    let segs = segments(path)?;
    let (leaf, ancestors) = segs.split_last()?;
    let Container { children, .. } = container_mut(schema, ancestors)?;
    children.get_mut(*leaf)
}

/// Whether the field at `path` is listed in its parent's required set.
pub fn is_required(schema: &ToolSchema, path: &str) -> bool {
    let Some(segs) = segments(path) else {
        return false;
    };
    let Some((leaf, ancestors)) = segs.split_last() else {
        return false;
    };
    container(schema, ancestors)
        .is_some_and(|c| c.required.iter().any(|name| name == leaf))
}
