//! Core schema type definitions.
//!
//! Defines [`ParamType`] (the five parameter kinds), [`ParameterNode`] (one named
//! field in the tree), [`ToolSchema`] (the root object being edited), the
//! [`VariableBindingMap`] side table, and [`EditorMode`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Child name -> node, for one level of the tree.
pub type ParameterMap = BTreeMap<String, ParameterNode>;

/// Dotted path (e.g. `"address.city"`) -> source expression.
///
/// A key being present means the field is filled from an external source
/// rather than generated by the model.
pub type VariableBindingMap = BTreeMap<String, String>;

/// The kind of value a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
    /// Named children under `parameter`.
    Object,
    /// A single element schema under `items`.
    Array,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    /// `true` for string, number and boolean.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::Object | Self::Array)
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ParamType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "boolean" => Ok(Self::Boolean),
            "object" => Ok(Self::Object),
            "array" => Ok(Self::Array),
            _ => Err(format!("unknown parameter type: {s}")),
        }
    }
}

/// One named field in the schema tree.
///
/// The wire shape keeps two container conventions: objects hold children
/// under `parameter`, arrays hold their element schema under `items`. Use
/// [`ParameterNode::element`] to step through an array transparently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterNode {
    #[serde(rename = "type")]
    pub param_type: ParamType,
    #[serde(default)]
    pub description: String,
    /// Allowed literal values. `None` means the enum is disabled; `Some([])`
    /// means enabled but empty.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<ParameterMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ParameterNode>>,
    /// Names of mandatory children in `parameter`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_params: Vec<String>,
    /// Keys this crate does not interpret, kept so saves do not drop them.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ParameterNode {
    /// A bare node of the given type with an empty description.
    ///
    /// Arrays get a string `items` node and objects an empty `parameter`
    /// map so that every node built here is structurally valid.
    pub fn new(param_type: ParamType) -> Self {
        let mut node = Self {
            param_type,
            description: String::new(),
            enum_values: None,
            parameter: None,
            items: None,
            required_params: Vec::new(),
            extra: BTreeMap::new(),
        };
        match param_type {
            ParamType::Array => node.items = Some(Box::new(Self::new(ParamType::String))),
            ParamType::Object => node.parameter = Some(ParameterMap::new()),
            _ => {}
        }
        node
    }

    /// The node whose `parameter` map holds this node's children: `items`
    /// for arrays, the node itself otherwise.
    pub fn element(&self) -> Option<&ParameterNode> {
        match self.param_type {
            ParamType::Array => self.items.as_deref(),
            _ => Some(self),
        }
    }

    pub fn element_mut(&mut self) -> Option<&mut ParameterNode> {
        match self.param_type {
            ParamType::Array => self.items.as_deref_mut(),
            _ => Some(self),
        }
    }

    /// Change this node's type, applying the transition rules.
    ///
    /// - to `array`: `items` becomes a string node; children and the
    ///   required set are dropped.
    /// - to `object`: an existing `parameter` map is kept (otherwise created),
    ///   `enum` resets to `[]` and `description` to `""`.
    /// - to a scalar: `items` and `parameter` are dropped.
    ///
    /// Returns `false` when the node already has this type.
    pub fn retype(&mut self, new_type: ParamType) -> bool {
        if self.param_type == new_type {
            return false;
        }
        match new_type {
            ParamType::Array => {
                self.items = Some(Box::new(ParameterNode::new(ParamType::String)));
                self.parameter = None;
                self.required_params.clear();
            }
            ParamType::Object => {
                self.parameter.get_or_insert_with(ParameterMap::new);
                self.enum_values = Some(Vec::new());
                self.description.clear();
                self.items = None;
            }
            ParamType::String | ParamType::Number | ParamType::Boolean => {
                self.items = None;
                self.parameter = None;
                self.required_params.clear();
            }
        }
        self.param_type = new_type;
        true
    }
}

/// The root object being edited: a tool (function-call) definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Top-level parameters.
    #[serde(default)]
    pub fields: ParameterMap,
    /// Names of mandatory top-level parameters.
    #[serde(default)]
    pub required_params: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    /// Stable identifier the binding store is keyed by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_id: Option<String>,
}

impl ToolSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            fields: ParameterMap::new(),
            required_params: Vec::new(),
            thread_id: None,
            version_id: None,
            script_id: None,
        }
    }

    /// Key under which this schema's bindings are stored: `script_id` when
    /// set, else the name.
    pub fn script_name(&self) -> &str {
        self.script_id.as_deref().unwrap_or(&self.name)
    }
}

/// Which caller context the editor is running in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EditorMode {
    /// An ordinary tool/function definition.
    #[default]
    Tool,
    /// Fields gathered before the tool runs; new fields are required by default.
    PreTool,
    /// Variable contract between agents; the name is not persisted.
    AgentVariables,
}

impl EditorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tool => "tool",
            Self::PreTool => "pre_tool",
            Self::AgentVariables => "agent_variables",
        }
    }

    pub fn required_by_default(&self) -> bool {
        matches!(self, Self::PreTool)
    }

    /// Whether a save should push the tool name.
    pub fn persists_name(&self) -> bool {
        matches!(self, Self::Tool | Self::PreTool)
    }
}

impl std::fmt::Display for EditorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EditorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tool" => Ok(Self::Tool),
            "pre_tool" | "pre-tool" => Ok(Self::PreTool),
            "agent_variables" | "agent-variables" => Ok(Self::AgentVariables),
            _ => Err(format!("unknown editor mode: {s}")),
        }
    }
}
