use anyhow::Result;

use toolschema::catalog::schemas;
use toolschema::config::ToolSchemaConfig;

/// List every stored schema, oldest first.
pub fn list(config: &ToolSchemaConfig) -> Result<()> {
    let conn = toolschema::db::open_database(&config.resolved_db_path())?;
    let summaries = schemas::list_schemas(&conn)?;

    if summaries.is_empty() {
        println!("No schemas stored. Create one with `toolschema create <name>`.");
        return Ok(());
    }

    println!("{:<38} {:<28} {:>6}  {}", "ID", "NAME", "PARAMS", "UPDATED");
    for s in &summaries {
        println!(
            "{:<38} {:<28} {:>6}  {}",
            s.id, s.name, s.parameter_count, s.updated_at
        );
    }
    println!();
    println!("{} schema(s)", summaries.len());
    Ok(())
}
