//! CLI `doctor` command: run database diagnostics and print a health report.

use anyhow::{Context, Result};

use toolschema::catalog::schemas;
use toolschema::config::ToolSchemaConfig;
use toolschema::db;
use toolschema::schema::validate;

/// Run database diagnostics, validate every stored schema, and print a report.
pub fn doctor(config: &ToolSchemaConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run `toolschema serve` or `toolschema create <name>` to initialize.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let conn = db::open_database(&db_path).context("failed to open database (may be corrupt)")?;
    let report = db::check_database_health(&conn).context("failed to run health check")?;

    println!("toolschema Health Report");
    println!("========================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!("Optimizer:         {}", config.optimizer.provider);
    println!();
    println!("Row counts:");
    println!("  Tool schemas:    {}", report.schema_count);
    println!("  Binding sets:    {}", report.binding_count);
    println!("  Edit log:        {}", report.log_count);
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
    }

    let mut broken = 0usize;
    match schemas::all_schemas(&conn) {
        Ok(all) => {
            for stored in &all {
                let violations = validate::validate(&stored.schema);
                if violations.is_empty() {
                    continue;
                }
                broken += 1;
                println!();
                println!("{} ({}):", stored.schema.name, stored.id);
                for v in &violations {
                    println!("  {}: {}", v.path, v.message);
                }
            }
            println!();
            println!("Schema check:      {} of {} with problems", broken, all.len());
        }
        Err(e) => {
            println!();
            println!("Schema check:      FAILED ({e:#})");
        }
    }

    if !report.integrity_ok {
        println!();
        println!("Recovery steps:");
        println!("  1. Restore from a backup: cp backup.db ~/.toolschema/schemas.db");
        println!("  2. Or export from a good copy and reimport:");
        println!("     toolschema export > backup.json");
        println!("     toolschema import backup.json");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
