use std::collections::HashMap;

use super::SchemaEditor;
use crate::error::EditError;

/// Open editors keyed by a caller-defined modal identifier.
///
/// Opening an identifier that is already open replaces its session; closing
/// discards the session and any unsaved draft with it.
#[derive(Debug, Default)]
pub struct ModalRegistry {
    editors: HashMap<String, SchemaEditor>,
}

impl ModalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (or replace) the session for `modal_id`. Returns the session it
    /// replaced, if any.
    pub fn open(&mut self, modal_id: impl Into<String>, editor: SchemaEditor) -> Option<SchemaEditor> {
        let modal_id = modal_id.into();
        tracing::debug!(modal = %modal_id, schema_id = %editor.schema_id(), "editor opened");
        self.editors.insert(modal_id, editor)
    }

    /// Close the session for `modal_id`. Returns `false` if none was open.
    pub fn close(&mut self, modal_id: &str) -> bool {
        let closed = self.editors.remove(modal_id).is_some();
        if closed {
            tracing::debug!(modal = %modal_id, "editor closed");
        }
        closed
    }

    pub fn get(&self, modal_id: &str) -> Result<&SchemaEditor, EditError> {
        self.editors
            .get(modal_id)
            .ok_or_else(|| EditError::NotOpen(modal_id.to_string()))
    }

    pub fn get_mut(&mut self, modal_id: &str) -> Result<&mut SchemaEditor, EditError> {
        self.editors
            .get_mut(modal_id)
            .ok_or_else(|| EditError::NotOpen(modal_id.to_string()))
    }

    pub fn is_open(&self, modal_id: &str) -> bool {
        self.editors.contains_key(modal_id)
    }

    /// Identifiers of all open sessions, sorted.
    pub fn open_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.editors.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EditorMode, ToolSchema, VariableBindingMap};

    fn editor(name: &str) -> SchemaEditor {
        SchemaEditor::new(name, ToolSchema::new(name), VariableBindingMap::new(), EditorMode::Tool)
    }

    #[test]
    fn open_close_roundtrip() {
        let mut registry = ModalRegistry::new();
        assert!(registry.open("tool-modal", editor("a")).is_none());
        assert!(registry.is_open("tool-modal"));

        let replaced = registry.open("tool-modal", editor("b")).unwrap();
        assert_eq!(replaced.schema_id(), "a");
        assert_eq!(registry.get("tool-modal").unwrap().schema_id(), "b");

        assert!(registry.close("tool-modal"));
        assert!(!registry.close("tool-modal"));
        assert!(matches!(registry.get_mut("tool-modal"), Err(EditError::NotOpen(_))));
    }

    #[test]
    fn open_ids_are_sorted() {
        let mut registry = ModalRegistry::new();
        registry.open("pre-tool", editor("x"));
        registry.open("agent", editor("y"));
        assert_eq!(registry.open_ids(), vec!["agent", "pre-tool"]);
    }
}
