//! What a save pushes, and what came back.
//!
//! The two writes are independent: the schema store and the binding store
//! are owned by different collaborators, so a partial failure is possible and
//! is reported rather than rolled back.

use serde::Serialize;

use crate::catalog::{BindingStore, SchemaPatch, SchemaStore};
use crate::schema::{ToolSchema, VariableBindingMap};

/// The writes a save needs, computed against the editor's baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct SavePlan {
    pub schema_id: String,
    /// Key of the binding store entry (the schema's stable script name).
    pub script_name: String,
    pub schema: Option<SchemaPatch>,
    pub bindings: Option<VariableBindingMap>,
}

impl SavePlan {
    pub fn is_empty(&self) -> bool {
        self.schema.is_none() && self.bindings.is_none()
    }

    /// Run both writes. A failure in one does not stop the other.
    pub fn execute(&self, schemas: &dyn SchemaStore, bindings: &dyn BindingStore) -> SaveReport {
        let schema = self.schema.as_ref().map(|patch| {
            let result = schemas.save_schema(&self.schema_id, patch);
            if let Err(e) = &result {
                tracing::warn!(schema_id = %self.schema_id, error = %e, "schema write failed");
            }
            result
        });
        let bindings = self.bindings.as_ref().map(|map| {
            let result = bindings.save_bindings(&self.script_name, map);
            if let Err(e) = &result {
                tracing::warn!(script = %self.script_name, error = %e, "binding write failed");
            }
            result
        });
        SaveReport { schema, bindings }
    }
}

/// Outcome of each write in a [`SavePlan`]; `None` means it was not needed.
#[derive(Debug, Default)]
pub struct SaveReport {
    pub schema: Option<anyhow::Result<()>>,
    pub bindings: Option<anyhow::Result<()>>,
}

impl SaveReport {
    /// Mark every write in `plan` as failed with `message`, for when the
    /// writes could not be run at all.
    pub fn failed(plan: &SavePlan, message: &str) -> Self {
        Self {
            schema: plan.schema.as_ref().map(|_| Err(anyhow::anyhow!("{message}"))),
            bindings: plan.bindings.as_ref().map(|_| Err(anyhow::anyhow!("{message}"))),
        }
    }

    pub fn is_ok(&self) -> bool {
        !matches!(self.schema, Some(Err(_))) && !matches!(self.bindings, Some(Err(_)))
    }

    /// Human-readable summary of whatever failed.
    pub fn failure_message(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(Err(e)) = &self.schema {
            parts.push(format!("schema: {e:#}"));
        }
        if let Some(Err(e)) = &self.bindings {
            parts.push(format!("bindings: {e:#}"));
        }
        (!parts.is_empty()).then(|| parts.join("; "))
    }
}

/// Handed back to the caller after a successful save so it can refresh its
/// cached copies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveOutcome {
    pub schema: ToolSchema,
    pub bindings: VariableBindingMap,
    pub schema_written: bool,
    pub bindings_written: bool,
}
