//! CRUD for the `tool_schemas` table.

use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::{write_audit_log, SchemaPatch};
use crate::schema::ToolSchema;

/// A schema row with its bookkeeping columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSchema {
    pub id: String,
    pub schema: ToolSchema,
    pub created_at: String,
    pub updated_at: String,
}

/// One line of `list_schemas` output.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaSummary {
    pub id: String,
    pub name: String,
    pub script_id: Option<String>,
    pub parameter_count: usize,
    pub updated_at: String,
}

/// Insert a new schema under a fresh UUID v7 and return the id.
///
/// A schema without a `script_id` gets the new id as its script id, so its
/// binding key survives tool renames.
pub fn create_schema(conn: &mut Connection, schema: &ToolSchema) -> Result<String> {
    let id = uuid::Uuid::now_v7().to_string();
    let mut schema = schema.clone();
    schema.script_id.get_or_insert_with(|| id.clone());
    insert_schema(conn, &id, &schema)?;
    Ok(id)
}

/// Insert a schema under a caller-chosen id (used by import).
pub fn insert_schema(conn: &mut Connection, id: &str, schema: &ToolSchema) -> Result<()> {
    let tx = conn.transaction()?;
    let now = chrono::Utc::now().to_rfc3339();

    tx.execute(
        "INSERT INTO tool_schemas (id, name, description, fields, required_params, script_id, thread_id, version_id, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        params![
            id,
            schema.name,
            schema.description,
            serde_json::to_string(&schema.fields)?,
            serde_json::to_string(&schema.required_params)?,
            schema.script_id,
            schema.thread_id,
            schema.version_id,
            now,
        ],
    )
    .with_context(|| format!("failed to insert schema {id}"))?;

    write_audit_log(&tx, "create", id, Some(&serde_json::json!({ "name": schema.name })))?;
    tx.commit()?;

    tracing::info!(id = %id, name = %schema.name, "schema created");
    Ok(())
}

pub fn schema_exists(conn: &Connection, id: &str) -> Result<bool> {
    Ok(conn.query_row(
        "SELECT COUNT(*) > 0 FROM tool_schemas WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?)
}

/// Raw columns, before JSON decoding.
struct SchemaRow {
    id: String,
    name: String,
    description: String,
    fields: String,
    required_params: String,
    script_id: Option<String>,
    thread_id: Option<bool>,
    version_id: Option<String>,
    created_at: String,
    updated_at: String,
}

const SELECT_COLUMNS: &str = "SELECT id, name, description, fields, required_params, script_id, thread_id, version_id, created_at, updated_at FROM tool_schemas";

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SchemaRow> {
    Ok(SchemaRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        fields: row.get(3)?,
        required_params: row.get(4)?,
        script_id: row.get(5)?,
        thread_id: row.get(6)?,
        version_id: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

impl SchemaRow {
    fn decode(self) -> Result<StoredSchema> {
        let fields = serde_json::from_str(&self.fields)
            .with_context(|| format!("schema {} has malformed fields JSON", self.id))?;
        let required_params = serde_json::from_str(&self.required_params)
            .with_context(|| format!("schema {} has malformed required_params JSON", self.id))?;
        Ok(StoredSchema {
            schema: ToolSchema {
                name: self.name,
                description: self.description,
                fields,
                required_params,
                thread_id: self.thread_id,
                version_id: self.version_id,
                script_id: self.script_id,
            },
            id: self.id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub fn get_schema(conn: &Connection, id: &str) -> Result<StoredSchema> {
    let row = conn
        .query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), params![id], read_row)
        .optional()?;
    match row {
        Some(row) => row.decode(),
        None => bail!("schema not found: {id}"),
    }
}

pub fn load_schema(conn: &Connection, id: &str) -> Result<ToolSchema> {
    Ok(get_schema(conn, id)?.schema)
}

/// Every stored schema, oldest first.
pub fn all_schemas(conn: &Connection) -> Result<Vec<StoredSchema>> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY created_at"))?;
    let rows = stmt
        .query_map([], read_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(SchemaRow::decode).collect()
}

pub fn list_schemas(conn: &Connection) -> Result<Vec<SchemaSummary>> {
    Ok(all_schemas(conn)?
        .into_iter()
        .map(|stored| SchemaSummary {
            parameter_count: stored.schema.fields.len(),
            name: stored.schema.name,
            script_id: stored.schema.script_id,
            id: stored.id,
            updated_at: stored.updated_at,
        })
        .collect())
}

/// Write the fields of `patch` over the stored schema.
pub fn save_schema(conn: &mut Connection, id: &str, patch: &SchemaPatch) -> Result<()> {
    let tx = conn.transaction()?;
    let now = chrono::Utc::now().to_rfc3339();

    let rows = tx.execute(
        "UPDATE tool_schemas SET name = COALESCE(?1, name), description = ?2, fields = ?3, required_params = ?4, updated_at = ?5 \
         WHERE id = ?6",
        params![
            patch.name,
            patch.description,
            serde_json::to_string(&patch.fields)?,
            serde_json::to_string(&patch.required_params)?,
            now,
            id,
        ],
    )?;
    if rows == 0 {
        bail!("schema not found: {id}");
    }

    let details = serde_json::json!({
        "renamed": patch.name.is_some(),
        "parameters": patch.fields.len(),
    });
    write_audit_log(&tx, "update_schema", id, Some(&details))?;
    tx.commit()?;

    tracing::info!(id = %id, "schema saved");
    Ok(())
}

/// Delete a schema. Returns `false` if it did not exist.
pub fn delete_schema(conn: &mut Connection, id: &str) -> Result<bool> {
    let tx = conn.transaction()?;
    let rows = tx.execute("DELETE FROM tool_schemas WHERE id = ?1", params![id])?;
    if rows > 0 {
        write_audit_log(&tx, "delete", id, None)?;
    }
    tx.commit()?;
    Ok(rows > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::schema::{ParamType, ParameterNode};

    fn sample() -> ToolSchema {
        let mut schema = ToolSchema::new("get_weather");
        schema.description = "Current weather".into();
        schema
            .fields
            .insert("city".into(), ParameterNode::new(ParamType::String));
        schema.required_params.push("city".into());
        schema.script_id = Some("scr_weather".into());
        schema
    }

    #[test]
    fn create_and_load_roundtrip() {
        let mut conn = db::open_memory_database().unwrap();
        let id = create_schema(&mut conn, &sample()).unwrap();
        assert_eq!(load_schema(&conn, &id).unwrap(), sample());
        assert!(schema_exists(&conn, &id).unwrap());
    }

    #[test]
    fn create_assigns_script_id_when_missing() {
        let mut conn = db::open_memory_database().unwrap();
        let id = create_schema(&mut conn, &ToolSchema::new("lookup")).unwrap();
        let loaded = load_schema(&conn, &id).unwrap();
        assert_eq!(loaded.script_id.as_deref(), Some(id.as_str()));
        assert_eq!(loaded.script_name(), id);
    }

    #[test]
    fn load_missing_schema_fails() {
        let conn = db::open_memory_database().unwrap();
        let err = load_schema(&conn, "nope").unwrap_err();
        assert!(err.to_string().contains("schema not found"));
    }

    #[test]
    fn save_without_name_keeps_name() {
        let mut conn = db::open_memory_database().unwrap();
        let id = create_schema(&mut conn, &sample()).unwrap();

        let patch = SchemaPatch {
            name: None,
            description: "Forecast".into(),
            fields: Default::default(),
            required_params: vec![],
        };
        save_schema(&mut conn, &id, &patch).unwrap();

        let loaded = load_schema(&conn, &id).unwrap();
        assert_eq!(loaded.name, "get_weather");
        assert_eq!(loaded.description, "Forecast");
        assert!(loaded.fields.is_empty());
    }

    #[test]
    fn save_writes_audit_log() {
        let mut conn = db::open_memory_database().unwrap();
        let id = create_schema(&mut conn, &sample()).unwrap();
        let patch = SchemaPatch {
            name: Some("get_forecast".into()),
            description: String::new(),
            fields: Default::default(),
            required_params: vec![],
        };
        save_schema(&mut conn, &id, &patch).unwrap();

        let ops: Vec<String> = conn
            .prepare("SELECT operation FROM edit_log WHERE target = ?1 ORDER BY id")
            .unwrap()
            .query_map(params![id], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(ops, vec!["create", "update_schema"]);
    }

    #[test]
    fn delete_and_list() {
        let mut conn = db::open_memory_database().unwrap();
        let a = create_schema(&mut conn, &sample()).unwrap();
        let _b = create_schema(&mut conn, &ToolSchema::new("other")).unwrap();
        assert_eq!(list_schemas(&conn).unwrap().len(), 2);

        assert!(delete_schema(&mut conn, &a).unwrap());
        assert!(!delete_schema(&mut conn, &a).unwrap());
        let remaining = list_schemas(&conn).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "other");
    }
}
