//! CLI `create` command: insert an empty tool schema.

use anyhow::Result;

use toolschema::catalog::schemas;
use toolschema::config::ToolSchemaConfig;
use toolschema::schema::ToolSchema;

/// Create a schema with no parameters and print its id.
pub fn create(
    config: &ToolSchemaConfig,
    name: &str,
    description: Option<&str>,
    script_id: Option<&str>,
) -> Result<()> {
    anyhow::ensure!(!name.trim().is_empty(), "tool name must not be empty");

    let mut conn = toolschema::db::open_database(&config.resolved_db_path())?;

    let mut schema = ToolSchema::new(name.trim());
    schema.description = description.unwrap_or_default().to_string();
    schema.script_id = script_id.map(str::to_string);

    let id = schemas::create_schema(&mut conn, &schema)?;
    println!("{id}");
    Ok(())
}
