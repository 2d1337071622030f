use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use toolschema::editor::EditOp;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct EditSchemaParams {
    #[schemars(description = "Identifier the session was opened with")]
    pub modal_id: String,

    #[schemars(
        description = "The edit to apply, tagged by 'op' (add_parameter, delete_parameter, rename_parameter, toggle_required, set_type, set_items_type, set_enum, set_description, set_binding, remove_binding, set_tool_name, set_tool_description). Paths are dotted, e.g. 'address.city'."
    )]
    pub edit: EditOp,
}
