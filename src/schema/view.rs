//! Serializer/parser pair behind the advanced (raw JSON) view.
//!
//! [`serialize`] snapshots `{name, description, fields}` as pretty JSON. The
//! snapshot is not a live binding: edits to the text only reach the tree when
//! [`parse`] succeeds and the resulting [`ViewPatch`] is applied.

use serde::Serialize;
use serde_json::{Map, Value};

use super::bindings;
use super::types::{ParameterMap, ToolSchema, VariableBindingMap};
use crate::error::EditError;

#[derive(Serialize)]
struct ViewSnapshot<'a> {
    name: &'a str,
    description: &'a str,
    fields: &'a ParameterMap,
}

/// Render the editable part of a schema as pretty-printed JSON.
pub fn serialize(name: &str, description: &str, fields: &ParameterMap) -> String {
    let snapshot = ViewSnapshot {
        name,
        description,
        fields,
    };
    // A map of plain data cannot fail to serialize.
    serde_json::to_string_pretty(&snapshot).unwrap_or_default()
}

/// Convenience wrapper over [`serialize`] for a whole schema.
pub fn serialize_schema(schema: &ToolSchema) -> String {
    serialize(&schema.name, &schema.description, &schema.fields)
}

/// What a parsed advanced-view text changes. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub fields: Option<ParameterMap>,
}

const VIEW_KEYS: [&str; 3] = ["name", "description", "fields"];

/// Parse advanced-view text.
///
/// Two shapes are accepted: an object carrying any of `name`,
/// `description`, `fields`; or (legacy) a plain object with none of those
/// keys, which is taken to be the `fields` map itself.
pub fn parse(text: &str) -> Result<ViewPatch, EditError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| EditError::InvalidJson(e.to_string()))?;
    let Value::Object(mut object) = value else {
        return Err(EditError::InvalidJson("expected a JSON object".into()));
    };

    if !VIEW_KEYS.iter().any(|key| object.contains_key(*key)) {
        return Ok(ViewPatch {
            fields: Some(parse_fields(Value::Object(object))?),
            ..ViewPatch::default()
        });
    }

    Ok(ViewPatch {
        name: take_string(&mut object, "name")?,
        description: take_string(&mut object, "description")?,
        fields: object.remove("fields").map(parse_fields).transpose()?,
    })
}

fn take_string(object: &mut Map<String, Value>, key: &str) -> Result<Option<String>, EditError> {
    match object.remove(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(EditError::InvalidJson(format!("`{key}` must be a string"))),
    }
}

fn parse_fields(value: Value) -> Result<ParameterMap, EditError> {
    serde_json::from_value(value).map_err(|e| EditError::InvalidJson(format!("fields: {e}")))
}

impl ViewPatch {
    /// Apply the patch to `schema`, returning `true` if anything changed.
    ///
    /// Replacing `fields` drops top-level required names that no longer exist
    /// and binding keys that no longer resolve.
    pub fn apply(self, schema: &mut ToolSchema, bindings: &mut VariableBindingMap) -> bool {
        let mut changed = false;
        if let Some(name) = self.name {
            changed |= schema.name != name;
            schema.name = name;
        }
        if let Some(description) = self.description {
            changed |= schema.description != description;
            schema.description = description;
        }
        if let Some(fields) = self.fields {
            changed |= schema.fields != fields;
            schema.fields = fields;
            let ToolSchema {
                fields,
                required_params,
                ..
            } = schema;
            let before = required_params.len();
            required_params.retain(|name| fields.contains_key(name));
            changed |= required_params.len() != before;
            changed |= bindings::prune_unresolved(schema, bindings, None) > 0;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{ParamType, ParameterNode};

    #[test]
    fn partial_object_leaves_missing_keys_alone() {
        let patch = parse(r#"{ "description": "Look up weather" }"#).unwrap();
        assert_eq!(patch.description.as_deref(), Some("Look up weather"));
        assert!(patch.name.is_none());
        assert!(patch.fields.is_none());
    }

    #[test]
    fn legacy_shape_is_fields_map() {
        let patch = parse(r#"{ "city": { "type": "string" } }"#).unwrap();
        let fields = patch.fields.unwrap();
        assert_eq!(fields["city"].param_type, ParamType::String);
        assert!(patch.name.is_none());
    }

    #[test]
    fn rejects_non_objects_and_bad_json() {
        assert!(matches!(parse("[1, 2]"), Err(EditError::InvalidJson(_))));
        assert!(matches!(parse("{ nope"), Err(EditError::InvalidJson(_))));
        assert!(matches!(parse(r#"{ "name": 5 }"#), Err(EditError::InvalidJson(_))));
        assert!(matches!(
            parse(r#"{ "fields": { "a": { "type": "date" } } }"#),
            Err(EditError::InvalidJson(_))
        ));
    }

    #[test]
    fn replacing_fields_prunes_top_level_required() {
        let mut schema = ToolSchema::new("t");
        schema
            .fields
            .insert("gone".into(), ParameterNode::new(ParamType::String));
        schema.required_params.push("gone".into());

        let mut bindings = VariableBindingMap::new();
        bindings.insert("gone".into(), "{{x}}".into());

        let patch = parse(r#"{ "fields": { "kept": { "type": "number" } } }"#).unwrap();
        assert!(patch.apply(&mut schema, &mut bindings));
        assert!(schema.required_params.is_empty());
        assert!(schema.fields.contains_key("kept"));
        assert!(bindings.is_empty());
    }

    #[test]
    fn unchanged_patch_reports_no_change() {
        let mut schema = ToolSchema::new("t");
        let patch = parse(&serialize_schema(&schema)).unwrap();
        assert!(!patch.apply(&mut schema, &mut VariableBindingMap::new()));
    }
}
