use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::schema::ParamType;

/// One user edit, in a form that can travel over JSON (MCP calls, CLI edit
/// scripts). Applied with [`super::SchemaEditor::apply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    /// Add a `new{N}` string parameter at the top level, or under `parent`.
    AddParameter {
        #[schemars(description = "Dotted path of the parent object; omit for top level")]
        #[serde(default)]
        parent: Option<String>,
    },
    DeleteParameter {
        path: String,
    },
    RenameParameter {
        path: String,
        new_name: String,
    },
    /// Flip whether the field is listed in its parent's required set.
    ToggleRequired {
        path: String,
    },
    SetType {
        path: String,
        #[serde(rename = "type")]
        param_type: ParamType,
    },
    /// Change the element type of an array.
    SetItemsType {
        path: String,
        #[serde(rename = "type")]
        param_type: ParamType,
    },
    SetEnum {
        path: String,
        #[schemars(description = "JSON array literal such as ['a','b']; omit or null to disable the enum")]
        #[serde(default)]
        values: Option<String>,
    },
    SetDescription {
        path: String,
        description: String,
    },
    SetBinding {
        path: String,
        source: String,
    },
    RemoveBinding {
        path: String,
    },
    SetToolName {
        name: String,
    },
    SetToolDescription {
        description: String,
    },
}
