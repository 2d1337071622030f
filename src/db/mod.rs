pub mod migrations;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;

/// Open (or create) the catalog database at the given path with the schema
/// initialized and migrations applied.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    // WAL lets the CLI read while a server holds the database open
    conn.pragma_update(None, "journal_mode", "WAL")?;

    schema::init_schema(&conn).context("failed to initialize schema")?;
    migrations::run_migrations(&conn).context("failed to run migrations")?;

    tracing::info!(path = %path.display(), "database initialized");
    Ok(conn)
}

/// Open a fully migrated in-memory database.
pub fn open_memory_database() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    schema::init_schema(&conn).context("failed to initialize schema")?;
    migrations::run_migrations(&conn).context("failed to run migrations")?;
    Ok(conn)
}

/// Result of [`check_database_health`].
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub schema_version: u32,
    pub schema_count: u64,
    pub binding_count: u64,
    pub log_count: u64,
    pub integrity_ok: bool,
    pub integrity_details: String,
}

/// Row counts plus SQLite's own integrity check.
pub fn check_database_health(conn: &Connection) -> Result<HealthReport> {
    let count = |table: &str| -> Result<u64> {
        let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(n as u64)
    };

    let integrity: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;

    Ok(HealthReport {
        schema_version: migrations::get_schema_version(conn)?,
        schema_count: count("tool_schemas")?,
        binding_count: count("variable_bindings")?,
        log_count: count("edit_log")?,
        integrity_ok: integrity == "ok",
        integrity_details: integrity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_of_fresh_database() {
        let conn = open_memory_database().unwrap();
        let report = check_database_health(&conn).unwrap();
        assert!(report.integrity_ok);
        assert_eq!(report.schema_version, migrations::CURRENT_SCHEMA_VERSION);
        assert_eq!(report.schema_count, 0);
    }

    #[test]
    fn open_database_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("schemas.db");
        let conn = open_database(&path).unwrap();
        assert!(path.exists());
        drop(conn);
    }
}
