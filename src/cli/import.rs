use anyhow::{Context, Result};
use std::path::Path;

use super::export::ExportData;
use toolschema::catalog::{bindings, schemas};
use toolschema::config::ToolSchemaConfig;
use toolschema::schema::validate;

/// Import schemas from a file produced by `export`.
///
/// Schemas whose id already exists are skipped, along with their bindings.
/// Structural problems are reported but do not block the import.
pub fn import(config: &ToolSchemaConfig, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read import file: {}", file.display()))?;
    let data: ExportData = serde_json::from_str(&json).context("failed to parse import JSON")?;

    let mut conn = toolschema::db::open_database(&config.resolved_db_path())?;

    let mut imported = 0u64;
    let mut skipped = 0u64;
    let mut binding_sets = 0u64;

    println!("Importing {} schema(s)...", data.schemas.len());

    for entry in &data.schemas {
        let stored = &entry.schema;
        if schemas::schema_exists(&conn, &stored.id)? {
            skipped += 1;
            continue;
        }

        for v in validate::validate(&stored.schema) {
            eprintln!("Warning: {} {}: {}", stored.id, v.path, v.message);
        }

        schemas::insert_schema(&mut conn, &stored.id, &stored.schema)?;
        imported += 1;

        if !entry.bindings.is_empty() {
            bindings::save_bindings(&mut conn, stored.schema.script_name(), &entry.bindings)?;
            binding_sets += 1;
        }
    }

    println!("Import complete:");
    println!("  Schemas imported: {imported}");
    println!("  Schemas skipped:  {skipped} (already exist)");
    println!("  Binding sets:     {binding_sets}");
    Ok(())
}
