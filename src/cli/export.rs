use anyhow::Result;
use serde::{Deserialize, Serialize};

use toolschema::catalog::{bindings, schemas, StoredSchema};
use toolschema::config::ToolSchemaConfig;
use toolschema::schema::VariableBindingMap;

/// One exported schema with the bindings stored under its script name.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportedSchema {
    pub schema: StoredSchema,
    #[serde(default)]
    pub bindings: VariableBindingMap,
}

/// Export format: every schema with its bindings.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportData {
    pub schemas: Vec<ExportedSchema>,
}

/// Export one schema (or all of them) as JSON to stdout.
pub fn export(config: &ToolSchemaConfig, id: Option<&str>) -> Result<()> {
    let conn = toolschema::db::open_database(&config.resolved_db_path())?;

    let stored = match id {
        Some(id) => vec![schemas::get_schema(&conn, id)?],
        None => schemas::all_schemas(&conn)?,
    };

    let mut exported = Vec::with_capacity(stored.len());
    for schema in stored {
        let map = bindings::load_bindings(&conn, schema.schema.script_name())?;
        exported.push(ExportedSchema {
            schema,
            bindings: map,
        });
    }

    let data = ExportData { schemas: exported };
    println!("{}", serde_json::to_string_pretty(&data)?);

    eprintln!("Exported {} schema(s).", data.schemas.len());
    Ok(())
}
