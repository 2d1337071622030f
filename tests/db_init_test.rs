use rusqlite::Connection;
use toolschema::db;

fn table_names(conn: &Connection) -> Vec<String> {
    conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[test]
fn init_creates_all_tables() {
    let conn = Connection::open_in_memory().unwrap();
    db::schema::init_schema(&conn).unwrap();

    assert_eq!(
        table_names(&conn),
        vec!["edit_log", "schema_meta", "tool_schemas", "variable_bindings"]
    );
}

#[test]
fn init_is_idempotent() {
    let conn = Connection::open_in_memory().unwrap();
    db::schema::init_schema(&conn).unwrap();
    db::schema::init_schema(&conn).unwrap();
    assert_eq!(table_names(&conn).len(), 4);
}

#[test]
fn edit_log_rejects_unknown_operations() {
    let conn = db::open_memory_database().unwrap();
    let result = conn.execute(
        "INSERT INTO edit_log (operation, target, created_at) VALUES ('truncate', 'x', '2024-01-01T00:00:00Z')",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn file_database_uses_wal() {
    let dir = tempfile::tempdir().unwrap();
    let conn = db::open_database(dir.path().join("schemas.db")).unwrap();
    let mode: String = conn
        .query_row("PRAGMA journal_mode", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");

    let report = db::check_database_health(&conn).unwrap();
    assert!(report.integrity_ok);
    assert_eq!(report.schema_count, 0);
}
