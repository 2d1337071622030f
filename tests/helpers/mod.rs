#![allow(dead_code)]

use anyhow::{bail, Result};
use rusqlite::Connection;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use toolschema::catalog::{BindingStore, SchemaPatch, SchemaStore, SqliteStore};
use toolschema::db;
use toolschema::schema::{ParamType, ParameterNode, ToolSchema, VariableBindingMap};

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    db::open_memory_database().unwrap()
}

/// A store over a fresh in-memory database.
pub fn test_store() -> SqliteStore {
    SqliteStore::new(test_db())
}

/// `send_invoice` with a required string, an optional object holding one
/// child, and an array of strings.
pub fn invoice_schema() -> ToolSchema {
    let mut customer = ParameterNode::new(ParamType::Object);
    customer.description = "Billing contact".into();
    if let Some(children) = customer.parameter.as_mut() {
        children.insert("email".into(), ParameterNode::new(ParamType::String));
    }
    customer.required_params.push("email".into());

    let mut schema = ToolSchema::new("send_invoice");
    schema.description = "Email an invoice".into();
    schema.script_id = Some("scr_invoice".into());
    schema
        .fields
        .insert("amount".into(), ParameterNode::new(ParamType::Number));
    schema.fields.insert("customer".into(), customer);
    schema
        .fields
        .insert("lines".into(), ParameterNode::new(ParamType::Array));
    schema.required_params.push("amount".into());
    schema
}

/// Store `schema` and return its id.
pub fn insert_schema(store: &SqliteStore, schema: &ToolSchema) -> String {
    store
        .with_conn(|conn| toolschema::catalog::schemas::create_schema(conn, schema))
        .unwrap()
}

/// In-memory stores whose writes can be made to fail on demand.
#[derive(Default)]
pub struct FlakyStore {
    pub schema: Mutex<Option<ToolSchema>>,
    pub bindings: Mutex<VariableBindingMap>,
    pub fail_schema: Mutex<bool>,
    pub fail_bindings: Mutex<bool>,
    pub schema_writes: AtomicUsize,
    pub binding_writes: AtomicUsize,
}

impl FlakyStore {
    pub fn new(schema: ToolSchema, bindings: VariableBindingMap) -> Self {
        Self {
            schema: Mutex::new(Some(schema)),
            bindings: Mutex::new(bindings),
            ..Self::default()
        }
    }

    pub fn fail_schema(&self, fail: bool) {
        *self.fail_schema.lock().unwrap() = fail;
    }

    pub fn fail_bindings(&self, fail: bool) {
        *self.fail_bindings.lock().unwrap() = fail;
    }

    pub fn schema_writes(&self) -> usize {
        self.schema_writes.load(Ordering::SeqCst)
    }

    pub fn binding_writes(&self) -> usize {
        self.binding_writes.load(Ordering::SeqCst)
    }
}

impl SchemaStore for FlakyStore {
    fn load_schema(&self, id: &str) -> Result<ToolSchema> {
        match self.schema.lock().unwrap().clone() {
            Some(schema) => Ok(schema),
            None => bail!("schema not found: {id}"),
        }
    }

    fn save_schema(&self, _id: &str, patch: &SchemaPatch) -> Result<()> {
        self.schema_writes.fetch_add(1, Ordering::SeqCst);
        if *self.fail_schema.lock().unwrap() {
            bail!("schema service unavailable");
        }
        if let Some(schema) = self.schema.lock().unwrap().as_mut() {
            patch.apply_to(schema);
        }
        Ok(())
    }
}

impl BindingStore for FlakyStore {
    fn load_bindings(&self, _script_name: &str) -> Result<VariableBindingMap> {
        Ok(self.bindings.lock().unwrap().clone())
    }

    fn save_bindings(&self, _script_name: &str, bindings: &VariableBindingMap) -> Result<()> {
        self.binding_writes.fetch_add(1, Ordering::SeqCst);
        if *self.fail_bindings.lock().unwrap() {
            bail!("binding service unavailable");
        }
        *self.bindings.lock().unwrap() = bindings.clone();
        Ok(())
    }
}
