//! Invariant checks over a whole schema tree.
//!
//! The mutators keep these invariants on their own; this module exists for
//! data that arrives from outside (imports, the advanced view, old rows).

use serde::Serialize;

use super::path::join;
use super::types::{ParamType, ParameterMap, ParameterNode, ToolSchema};

/// One broken invariant, located by dotted path (`""` for the top level).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

/// Check every node in `schema` and return all violations found.
pub fn validate(schema: &ToolSchema) -> Vec<Violation> {
    let mut out = Vec::new();
    check_level(&schema.fields, &schema.required_params, "", true, &mut out);
    out
}

fn check_level(
    children: &ParameterMap,
    required: &[String],
    parent_path: &str,
    parent_required: bool,
    out: &mut Vec<Violation>,
) {
    for name in required {
        if !children.contains_key(name) {
            out.push(Violation {
                path: parent_path.to_string(),
                message: format!("required name `{name}` has no matching parameter"),
            });
        }
    }

    for (name, node) in children {
        let path = join(parent_path, name);
        let is_required = required.contains(name);
        if is_required && !parent_required {
            out.push(Violation {
                path: path.clone(),
                message: "required while a parent is optional".into(),
            });
        }
        check_node(node, &path, is_required, out);
    }
}

fn check_node(node: &ParameterNode, path: &str, required: bool, out: &mut Vec<Violation>) {
    let mut push = |message: &str| {
        out.push(Violation {
            path: path.to_string(),
            message: message.to_string(),
        })
    };

    if node.param_type != ParamType::Object && node.parameter.is_some() {
        push("`parameter` is only valid on objects");
    }
    if node.param_type != ParamType::Object && !node.required_params.is_empty() {
        push("`required_params` is only valid on objects");
    }
    match (node.param_type, &node.items) {
        (ParamType::Array, None) => push("array is missing `items`"),
        (ParamType::Array, Some(_)) => {}
        (_, Some(_)) => push("`items` is only valid on arrays"),
        (_, None) => {}
    }

    match node.param_type {
        ParamType::Object => {
            if let Some(children) = &node.parameter {
                check_level(children, &node.required_params, path, required, out);
            }
        }
        ParamType::Array => {
            if let Some(items) = &node.items {
                check_items(items, path, required, out);
            }
        }
        _ => {}
    }
}

/// The `items` node has no name of its own; its children share the array's path.
fn check_items(items: &ParameterNode, path: &str, required: bool, out: &mut Vec<Violation>) {
    if items.param_type == ParamType::Array {
        out.push(Violation {
            path: path.to_string(),
            message: "nested arrays are not supported".into(),
        });
        return;
    }
    check_node(items, path, required, out);
}
