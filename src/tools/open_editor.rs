use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct OpenEditorParams {
    #[schemars(description = "Caller-chosen identifier for this editing session (e.g. the modal name)")]
    pub modal_id: String,

    #[schemars(description = "ID of the stored tool schema to edit")]
    pub schema_id: String,

    #[schemars(
        description = "Editing mode: 'tool' (default), 'pre_tool' (new fields required by default), or 'agent_variables'"
    )]
    pub mode: Option<String>,

    #[schemars(description = "Open without permission to edit or save (default: false)")]
    pub read_only: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ModalParams {
    #[schemars(description = "Identifier the session was opened with")]
    pub modal_id: String,
}
