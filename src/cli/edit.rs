//! CLI `edit` command: run a batch of edits through an editor session.
//!
//! The ops file is a JSON array of edit operations, for example:
//!
//! ```json
//! [
//!   { "op": "add_parameter" },
//!   { "op": "rename_parameter", "path": "new0", "new_name": "city" },
//!   { "op": "set_binding", "path": "city", "source": "{{geo.city}}" }
//! ]
//! ```
//!
//! Alternatively `--advanced` replaces the draft with the contents of a JSON
//! file in the advanced-view format, optionally cleaned up by the configured
//! optimizer first.

use anyhow::{Context, Result};
use std::path::Path;

use toolschema::catalog::SqliteStore;
use toolschema::config::ToolSchemaConfig;
use toolschema::editor::{EditOp, SchemaEditor};
use toolschema::optimize;
use toolschema::schema::{validate, view, EditorMode};

/// What to feed the editor.
pub struct EditInput<'a> {
    pub ops: Option<&'a Path>,
    pub advanced: Option<&'a Path>,
    pub optimize: bool,
}

pub async fn edit(
    config: &ToolSchemaConfig,
    id: &str,
    input: EditInput<'_>,
    mode: EditorMode,
    dry_run: bool,
) -> Result<()> {
    anyhow::ensure!(
        input.ops.is_some() || input.advanced.is_some(),
        "nothing to do: pass --ops and/or --advanced"
    );

    let conn = toolschema::db::open_database(&config.resolved_db_path())?;
    let store = SqliteStore::new(conn);
    let mut editor = SchemaEditor::load(id, &store, &store, mode)?;

    if let Some(file) = input.advanced {
        let text = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        editor.enter_advanced();
        editor.set_advanced_text(text)?;
        if input.optimize {
            let optimizer = optimize::create_optimizer(&config.optimizer)?;
            editor.optimize_json(&optimizer).await?;
        }
        editor.leave_advanced()?;
    }

    if let Some(file) = input.ops {
        let json = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let ops: Vec<EditOp> =
            serde_json::from_str(&json).context("failed to parse edit operations")?;

        let mut changed = 0usize;
        for (i, op) in ops.into_iter().enumerate() {
            let applied = editor
                .apply(op)
                .with_context(|| format!("edit #{} rejected", i + 1))?;
            if applied {
                changed += 1;
            }
        }
        println!("Applied {changed} edit(s) that changed the draft.");
    }

    for v in validate::validate(editor.schema()) {
        eprintln!("Warning: {}: {}", v.path, v.message);
    }

    if dry_run {
        println!("{}", view::serialize_schema(editor.schema()));
        if !editor.bindings().is_empty() {
            println!("{}", serde_json::to_string_pretty(editor.bindings())?);
        }
        println!("Dry run: nothing saved.");
        return Ok(());
    }

    if !editor.can_save() {
        println!("No changes to save.");
        return Ok(());
    }

    let outcome = editor.save(&store, &store)?;
    println!("Saved {id}:");
    println!("  Schema written:   {}", outcome.schema_written);
    println!("  Bindings written: {}", outcome.bindings_written);
    Ok(())
}
