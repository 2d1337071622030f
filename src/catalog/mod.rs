//! Persistence for tool schemas and their variable bindings.
//!
//! The editor only sees the [`SchemaStore`] and [`BindingStore`] traits. In a
//! deployment they are backed by different services. [`SqliteStore`] implements both over one rusqlite
//! connection for the CLI and MCP server.

pub mod bindings;
pub mod schemas;

pub use schemas::{SchemaSummary, StoredSchema};

use anyhow::Result;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::schema::{ParameterMap, ToolSchema, VariableBindingMap};

/// The schema fields a save may push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaPatch {
    /// Present only in modes that persist the tool name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub description: String,
    pub fields: ParameterMap,
    pub required_params: Vec<String>,
}

impl SchemaPatch {
    pub fn apply_to(&self, schema: &mut ToolSchema) {
        if let Some(name) = &self.name {
            schema.name = name.clone();
        }
        schema.description = self.description.clone();
        schema.fields = self.fields.clone();
        schema.required_params = self.required_params.clone();
    }
}

/// Source and sink for tool schemas, addressed by database id.
///
/// All methods are synchronous; async callers should use
/// `tokio::task::spawn_blocking`.
pub trait SchemaStore: Send + Sync {
    fn load_schema(&self, id: &str) -> Result<ToolSchema>;

    fn save_schema(&self, id: &str, patch: &SchemaPatch) -> Result<()>;
}

/// Source and sink for binding maps, keyed by the schema's script name.
pub trait BindingStore: Send + Sync {
    /// A script with no stored bindings yields an empty map.
    fn load_bindings(&self, script_name: &str) -> Result<VariableBindingMap>;

    fn save_bindings(&self, script_name: &str, bindings: &VariableBindingMap) -> Result<()>;
}

/// Both stores over a shared SQLite connection.
#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    pub fn from_shared(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    /// Run `f` with the connection locked.
    pub fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut conn = self
            .db
            .lock()
            .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;
        f(&mut conn)
    }
}

impl SchemaStore for SqliteStore {
    fn load_schema(&self, id: &str) -> Result<ToolSchema> {
        self.with_conn(|conn| schemas::load_schema(conn, id))
    }

    fn save_schema(&self, id: &str, patch: &SchemaPatch) -> Result<()> {
        self.with_conn(|conn| schemas::save_schema(conn, id, patch))
    }
}

impl BindingStore for SqliteStore {
    fn load_bindings(&self, script_name: &str) -> Result<VariableBindingMap> {
        self.with_conn(|conn| bindings::load_bindings(conn, script_name))
    }

    fn save_bindings(&self, script_name: &str, map: &VariableBindingMap) -> Result<()> {
        self.with_conn(|conn| bindings::save_bindings(conn, script_name, map))
    }
}

/// Write an entry to the edit_log audit table.
pub(crate) fn write_audit_log(
    conn: &Connection,
    operation: &str,
    target: &str,
    details: Option<&serde_json::Value>,
) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    let details_json = details.map(|d| d.to_string());
    conn.execute(
        "INSERT INTO edit_log (operation, target, details, created_at) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![operation, target, details_json, now],
    )?;
    Ok(())
}
