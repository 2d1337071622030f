mod helpers;

use serde_json::json;
use toolschema::error::EditError;
use toolschema::schema::view;
use toolschema::schema::{ToolSchema, VariableBindingMap};

#[test]
fn advanced_view_round_trip_is_lossless() {
    let mut schema = helpers::invoice_schema();
    // Unknown keys must survive the trip too.
    schema
        .fields
        .get_mut("amount")
        .unwrap()
        .extra
        .insert("x-format".into(), json!("currency"));
    toolschema::schema::mutate::set_enum(&mut schema, "amount", Some("[10, 20]")).unwrap();

    let text = view::serialize_schema(&schema);
    let patch = view::parse(&text).unwrap();

    assert_eq!(patch.name.as_deref(), Some(schema.name.as_str()));
    assert_eq!(patch.description.as_deref(), Some(schema.description.as_str()));
    assert_eq!(patch.fields.as_ref(), Some(&schema.fields));

    let mut reparsed = schema.clone();
    assert!(!patch.apply(&mut reparsed, &mut VariableBindingMap::new()));
    assert_eq!(reparsed, schema);
}

#[test]
fn legacy_fields_only_text_replaces_fields() {
    let mut schema = helpers::invoice_schema();
    let text = json!({
        "amount": { "type": "number", "description": "Total in cents" }
    })
    .to_string();

    let patch = view::parse(&text).unwrap();
    assert!(patch.name.is_none());
    assert!(patch.apply(&mut schema, &mut VariableBindingMap::new()));

    assert_eq!(schema.name, "send_invoice");
    assert_eq!(schema.fields.len(), 1);
    assert_eq!(schema.fields["amount"].description, "Total in cents");
    assert_eq!(schema.required_params, vec!["amount"]);
}

#[test]
fn dropped_fields_leave_no_dangling_required_names() {
    let mut schema = helpers::invoice_schema();
    let text = json!({ "name": "send_invoice", "fields": {} }).to_string();

    view::parse(&text).unwrap().apply(&mut schema, &mut VariableBindingMap::new());
    assert!(schema.fields.is_empty());
    assert!(schema.required_params.is_empty());
}

#[test]
fn invalid_text_is_rejected() {
    assert!(matches!(view::parse("{ nope"), Err(EditError::InvalidJson(_))));
    assert!(matches!(view::parse("[1, 2]"), Err(EditError::InvalidJson(_))));
    assert!(matches!(
        view::parse(r#"{"name": 5}"#),
        Err(EditError::InvalidJson(_))
    ));
    assert!(matches!(
        view::parse(r#"{"fields": {"a": {"type": "date"}}}"#),
        Err(EditError::InvalidJson(_))
    ));
}

#[test]
fn empty_schema_serializes_all_three_keys() {
    let text = view::serialize_schema(&ToolSchema::new("noop"));
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value, json!({ "name": "noop", "description": "", "fields": {} }));
}

#[test]
fn replacing_fields_drops_bindings_that_no_longer_resolve() {
    let mut schema = helpers::invoice_schema();
    let mut bindings = VariableBindingMap::new();
    bindings.insert("customer.email".into(), "{{crm.email}}".into());
    bindings.insert("lines".into(), "{{order.lines}}".into());
    bindings.insert("amount".into(), "{{order.total}}".into());

    let text = json!({
        "fields": {
            "amount": { "type": "number" },
            "customer": { "type": "object", "parameter": {} }
        }
    })
    .to_string();
    assert!(view::parse(&text).unwrap().apply(&mut schema, &mut bindings));

    assert_eq!(bindings.keys().collect::<Vec<_>>(), vec!["amount"]);
}
