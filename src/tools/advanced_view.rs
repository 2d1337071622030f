//! MCP parameter definitions for the advanced (raw JSON) view tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SwitchViewParams {
    #[schemars(description = "Identifier the session was opened with")]
    pub modal_id: String,

    #[schemars(
        description = "'advanced' to edit raw JSON, 'simple' to apply the JSON and return to field editing"
    )]
    pub view: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SetAdvancedTextParams {
    #[schemars(description = "Identifier the session was opened with")]
    pub modal_id: String,

    #[schemars(description = "Replacement JSON text for the advanced view")]
    pub text: String,

    #[schemars(description = "Also parse the text into the draft now, staying in the advanced view (default: false)")]
    pub apply: Option<bool>,
}
