//! Storage for variable binding maps, one JSON document per script name.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::write_audit_log;
use crate::schema::VariableBindingMap;

pub fn load_bindings(conn: &Connection, script_name: &str) -> Result<VariableBindingMap> {
    let stored: Option<String> = conn
        .query_row(
            "SELECT bindings FROM variable_bindings WHERE script_name = ?1",
            params![script_name],
            |row| row.get(0),
        )
        .optional()?;

    match stored {
        Some(json) => serde_json::from_str(&json)
            .with_context(|| format!("bindings for {script_name} are malformed")),
        None => Ok(VariableBindingMap::new()),
    }
}

/// Replace the binding map stored for `script_name`.
pub fn save_bindings(
    conn: &mut Connection,
    script_name: &str,
    bindings: &VariableBindingMap,
) -> Result<()> {
    let tx = conn.transaction()?;
    let now = chrono::Utc::now().to_rfc3339();

    tx.execute(
        "INSERT INTO variable_bindings (script_name, bindings, updated_at) VALUES (?1, ?2, ?3) \
         ON CONFLICT(script_name) DO UPDATE SET bindings = excluded.bindings, updated_at = excluded.updated_at",
        params![script_name, serde_json::to_string(bindings)?, now],
    )?;
    write_audit_log(
        &tx,
        "update_bindings",
        script_name,
        Some(&serde_json::json!({ "count": bindings.len() })),
    )?;
    tx.commit()?;

    tracing::info!(script = %script_name, count = bindings.len(), "bindings saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn missing_script_has_no_bindings() {
        let conn = db::open_memory_database().unwrap();
        assert!(load_bindings(&conn, "scr_none").unwrap().is_empty());
    }

    #[test]
    fn save_replaces_previous_map() {
        let mut conn = db::open_memory_database().unwrap();
        let mut map = VariableBindingMap::new();
        map.insert("user.email".into(), "{{session.email}}".into());
        save_bindings(&mut conn, "scr_1", &map).unwrap();

        map.clear();
        map.insert("city".into(), "{{geo.city}}".into());
        save_bindings(&mut conn, "scr_1", &map).unwrap();

        assert_eq!(load_bindings(&conn, "scr_1").unwrap(), map);
    }
}
