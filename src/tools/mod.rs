pub mod advanced_view;
pub mod edit_schema;
pub mod open_editor;

use advanced_view::{SetAdvancedTextParams, SwitchViewParams};
use edit_schema::EditSchemaParams;
use open_editor::{ModalParams, OpenEditorParams};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use std::sync::{Arc, Mutex};

use toolschema::catalog::SqliteStore;
use toolschema::editor::{ModalRegistry, SaveReport, SchemaEditor};
use toolschema::error::EditError;
use toolschema::optimize::{JsonOptimizer, Optimizer};
use toolschema::schema::EditorMode;

/// The toolschema MCP tool handler. Holds the catalog store, the open editing
/// sessions, and the optimizer, and exposes the editor via `#[tool_router]`.
#[derive(Clone)]
pub struct SchemaTools {
    tool_router: ToolRouter<Self>,
    store: SqliteStore,
    sessions: Arc<Mutex<ModalRegistry>>,
    optimizer: Arc<Optimizer>,
}

impl SchemaTools {
    /// Run `f` against the session for `modal_id` with the registry locked.
    /// The lock is never held across an await.
    fn with_session<T>(
        &self,
        modal_id: &str,
        f: impl FnOnce(&mut SchemaEditor) -> Result<T, EditError>,
    ) -> Result<T, String> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|e| format!("session lock poisoned: {e}"))?;
        let editor = sessions.get_mut(modal_id).map_err(|e| e.to_string())?;
        f(editor).map_err(|e| e.to_string())
    }

    fn snapshot_json(&self, modal_id: &str) -> Result<String, String> {
        self.with_session(modal_id, |editor| Ok(serde_json::to_string(&editor.snapshot())))?
            .map_err(|e| format!("serialization failed: {e}"))
    }
}

#[tool_router]
impl SchemaTools {
    pub fn new(
        store: SqliteStore,
        sessions: Arc<Mutex<ModalRegistry>>,
        optimizer: Arc<Optimizer>,
    ) -> Self {
        Self {
            tool_router: Self::tool_router(),
            store,
            sessions,
            optimizer,
        }
    }

    /// Load a stored schema and its bindings into a new editing session.
    #[tool(description = "Open an editing session on a stored tool schema. Returns the session state, including the schema and its variable bindings.")]
    async fn open_editor(
        &self,
        Parameters(params): Parameters<OpenEditorParams>,
    ) -> Result<String, String> {
        let mode = match &params.mode {
            Some(m) => m.parse::<EditorMode>()?,
            None => EditorMode::default(),
        };

        tracing::info!(
            modal = %params.modal_id,
            schema_id = %params.schema_id,
            mode = %mode,
            "open_editor called"
        );

        // Sync DB reads → spawn_blocking
        let store = self.store.clone();
        let schema_id = params.schema_id.clone();
        let editor = tokio::task::spawn_blocking(move || {
            SchemaEditor::load(&schema_id, &store, &store, mode)
        })
        .await
        .map_err(|e| format!("db task failed: {e}"))?
        .map_err(|e| format!("load failed: {e:#}"))?
        .read_only(params.read_only.unwrap_or(false));

        {
            let mut sessions = self
                .sessions
                .lock()
                .map_err(|e| format!("session lock poisoned: {e}"))?;
            sessions.open(params.modal_id.clone(), editor);
        }

        self.snapshot_json(&params.modal_id)
    }

    /// Apply one structured edit to a session's draft.
    #[tool(description = "Apply one edit to an open session's draft schema (add, delete, rename, retype, enum, description, required toggle, bindings). Nothing is persisted until save_editor.")]
    async fn edit_schema(
        &self,
        Parameters(params): Parameters<EditSchemaParams>,
    ) -> Result<String, String> {
        tracing::info!(modal = %params.modal_id, edit = ?params.edit, "edit_schema called");

        let changed = self.with_session(&params.modal_id, |editor| editor.apply(params.edit))?;
        let editor = self.snapshot_json(&params.modal_id)?;
        Ok(format!(r#"{{"changed":{changed},"editor":{editor}}}"#))
    }

    /// Switch between the structured and raw-JSON views.
    #[tool(description = "Switch a session between the 'simple' (structured) and 'advanced' (raw JSON) views. Leaving the advanced view parses the JSON; invalid JSON keeps the session in the advanced view.")]
    async fn switch_view(
        &self,
        Parameters(params): Parameters<SwitchViewParams>,
    ) -> Result<String, String> {
        tracing::info!(modal = %params.modal_id, view = %params.view, "switch_view called");

        match params.view.as_str() {
            "advanced" => self.with_session(&params.modal_id, |editor| {
                editor.enter_advanced();
                Ok(())
            })?,
            "simple" => {
                self.with_session(&params.modal_id, |editor| editor.leave_advanced())?;
            }
            other => return Err(format!("unknown view: {other}. Expected 'simple' or 'advanced'")),
        }
        self.snapshot_json(&params.modal_id)
    }

    /// Replace the advanced view's JSON text.
    #[tool(description = "Replace the raw JSON text of a session in the advanced view. Set apply=true to parse it into the draft immediately.")]
    async fn set_advanced_text(
        &self,
        Parameters(params): Parameters<SetAdvancedTextParams>,
    ) -> Result<String, String> {
        tracing::info!(modal = %params.modal_id, text_len = params.text.len(), "set_advanced_text called");

        let apply = params.apply.unwrap_or(false);
        self.with_session(&params.modal_id, |editor| {
            editor.set_advanced_text(params.text)?;
            if apply {
                editor.apply_advanced()?;
            }
            Ok(())
        })?;
        self.snapshot_json(&params.modal_id)
    }

    /// Run the advanced view's text through the configured optimizer.
    #[tool(description = "Clean up the advanced view's JSON with the configured optimizer. Only the text changes; the draft updates when the view is applied.")]
    async fn optimize_json(
        &self,
        Parameters(params): Parameters<ModalParams>,
    ) -> Result<String, String> {
        tracing::info!(modal = %params.modal_id, "optimize_json called");

        let text = self.with_session(&params.modal_id, |editor| {
            editor
                .advanced_text()
                .map(str::to_string)
                .ok_or(EditError::AdvancedViewInactive)
        })?;

        let optimized = self
            .optimizer
            .optimize(&text)
            .await
            .map_err(|e| format!("optimize failed: {e:#}"))?;

        self.with_session(&params.modal_id, |editor| editor.set_advanced_text(optimized))?;
        self.snapshot_json(&params.modal_id)
    }

    /// Persist the session's schema and bindings.
    #[tool(description = "Save an open session: pushes changed schema fields and changed variable bindings as two independent writes. On failure the session stays dirty.")]
    async fn save_editor(
        &self,
        Parameters(params): Parameters<ModalParams>,
    ) -> Result<String, String> {
        tracing::info!(modal = %params.modal_id, "save_editor called");

        let plan = self.with_session(&params.modal_id, |editor| editor.begin_save())?;

        // Sync DB writes → spawn_blocking
        let store = self.store.clone();
        let task_plan = plan.clone();
        let report = match tokio::task::spawn_blocking(move || task_plan.execute(&store, &store)).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(modal = %params.modal_id, error = %e, "save task failed");
                SaveReport::failed(&plan, &format!("db task failed: {e}"))
            }
        };

        let outcome =
            self.with_session(&params.modal_id, |editor| editor.finish_save(plan, report))?;

        tracing::info!(
            modal = %params.modal_id,
            schema_written = outcome.schema_written,
            bindings_written = outcome.bindings_written,
            "editor saved"
        );

        serde_json::to_string(&outcome).map_err(|e| format!("serialization failed: {e}"))
    }

    /// Show a session's current state.
    #[tool(description = "Show an open session's state: draft schema, bindings, view, and whether it can be saved.")]
    async fn show_editor(
        &self,
        Parameters(params): Parameters<ModalParams>,
    ) -> Result<String, String> {
        tracing::info!(modal = %params.modal_id, "show_editor called");
        self.snapshot_json(&params.modal_id)
    }

    /// Close a session, discarding unsaved edits.
    #[tool(description = "Close an editing session. Unsaved edits are discarded.")]
    async fn close_editor(
        &self,
        Parameters(params): Parameters<ModalParams>,
    ) -> Result<String, String> {
        tracing::info!(modal = %params.modal_id, "close_editor called");

        let closed = self
            .sessions
            .lock()
            .map_err(|e| format!("session lock poisoned: {e}"))?
            .close(&params.modal_id);

        Ok(serde_json::json!({ "modal_id": params.modal_id, "closed": closed }).to_string())
    }
}

#[tool_handler]
impl ServerHandler for SchemaTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "toolschema edits the parameter schemas of LLM tools. Use open_editor to start a \
                 session, edit_schema to change fields, and save_editor to persist."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
