//! CLI `show` command: display one schema, its bindings, and any structural
//! problems.

use anyhow::Result;

use toolschema::catalog::{bindings, schemas};
use toolschema::config::ToolSchemaConfig;
use toolschema::schema::{validate, view};

pub fn show(config: &ToolSchemaConfig, id: &str) -> Result<()> {
    let conn = toolschema::db::open_database(&config.resolved_db_path())?;
    let stored = schemas::get_schema(&conn, id)?;
    let schema = &stored.schema;
    let map = bindings::load_bindings(&conn, schema.script_name())?;

    println!("Schema: {}", stored.id);
    println!("{}", "=".repeat(50));
    println!("  Name:           {}", schema.name);
    if let Some(ref script) = schema.script_id {
        println!("  Script:         {script}");
    }
    if let Some(ref version) = schema.version_id {
        println!("  Version:        {version}");
    }
    println!("  Created:        {}", stored.created_at);
    println!("  Updated:        {}", stored.updated_at);
    println!();
    println!("{}", view::serialize_schema(schema));

    if !map.is_empty() {
        println!();
        println!("Variable bindings:");
        for (path, source) in &map {
            println!("  {path} <- {source}");
        }
    }

    let violations = validate::validate(schema);
    if !violations.is_empty() {
        println!();
        println!("Problems:");
        for v in &violations {
            println!("  {}: {}", v.path, v.message);
        }
    }

    Ok(())
}
