//! SQL DDL for all toolschema tables.
//!
//! Defines the `tool_schemas`, `variable_bindings`, `edit_log`, and
//! `schema_meta` tables. All DDL uses `IF NOT EXISTS` for idempotent
//! initialization.

use rusqlite::Connection;

/// All schema DDL statements for the catalog tables.
const SCHEMA_SQL: &str = r#"
-- Tool definitions; fields and required_params are JSON text
CREATE TABLE IF NOT EXISTS tool_schemas (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    fields TEXT NOT NULL DEFAULT '{}',
    required_params TEXT NOT NULL DEFAULT '[]',
    script_id TEXT,
    thread_id INTEGER,
    version_id TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tool_schemas_name ON tool_schemas(name);

-- Variable bindings, keyed by the schema's stable script name
CREATE TABLE IF NOT EXISTS variable_bindings (
    script_name TEXT PRIMARY KEY,
    bindings TEXT NOT NULL DEFAULT '{}',
    updated_at TEXT NOT NULL
);

-- Audit log
CREATE TABLE IF NOT EXISTS edit_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    operation TEXT NOT NULL CHECK(operation IN ('create','update_schema','update_bindings','delete')),
    target TEXT NOT NULL,
    details TEXT,
    created_at TEXT NOT NULL
);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
