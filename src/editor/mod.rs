//! Editing sessions: local draft state, the simple/advanced view toggle, and
//! the save/discard state machine.
//!
//! A [`SchemaEditor`] owns a baseline (the last externally provided schema and
//! binding map) and a draft. All edits go to the draft; [`SchemaEditor::save`]
//! pushes the difference and [`SchemaEditor::cancel`] throws the draft away.
//!
//! ```text
//! Clean --edit--> Dirty --begin_save--> Saving --ok--> Clean
//!   ^               |                      |
//!   +----cancel-----+                      +--failure--> Dirty
//! ```

pub mod ops;
pub mod registry;
pub mod save;

pub use ops::EditOp;
pub use registry::ModalRegistry;
pub use save::{SaveOutcome, SavePlan, SaveReport};

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::{BindingStore, SchemaPatch, SchemaStore};
use crate::error::EditError;
use crate::optimize::JsonOptimizer;
use crate::schema::{mutate, view, EditorMode, ParamType, ToolSchema, VariableBindingMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorState {
    /// No local edits since the last load or save.
    Clean,
    Dirty,
    /// A save is in flight; edits and further saves are refused.
    Saving,
}

/// Which editing surface is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Structured per-field cards.
    Simple,
    /// Raw JSON text, snapshotted on entry.
    Advanced { text: String },
}

/// One open editing session over a single tool schema.
#[derive(Debug, Clone)]
pub struct SchemaEditor {
    schema_id: String,
    mode: EditorMode,
    read_only: bool,
    baseline: ToolSchema,
    baseline_bindings: VariableBindingMap,
    /// Binding-store key that `baseline_bindings` were loaded from or last
    /// written to.
    bindings_key: String,
    draft: ToolSchema,
    bindings: VariableBindingMap,
    state: EditorState,
    view: View,
}

/// Serializable view of an editor, for surfaces that report session state.
#[derive(Debug, Serialize)]
pub struct EditorSnapshot<'a> {
    pub schema_id: &'a str,
    pub mode: EditorMode,
    pub read_only: bool,
    pub state: EditorState,
    pub can_save: bool,
    pub advanced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced_text: Option<&'a str>,
    pub schema: &'a ToolSchema,
    pub bindings: &'a VariableBindingMap,
}

impl SchemaEditor {
    pub fn new(
        schema_id: impl Into<String>,
        schema: ToolSchema,
        bindings: VariableBindingMap,
        mode: EditorMode,
    ) -> Self {
        Self {
            schema_id: schema_id.into(),
            mode,
            read_only: false,
            bindings_key: schema.script_name().to_string(),
            baseline: schema.clone(),
            baseline_bindings: bindings.clone(),
            draft: schema,
            bindings,
            state: EditorState::Clean,
            view: View::Simple,
        }
    }

    /// Open the session read-only: edits and saves are refused.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Load both stores and open a session on the result.
    pub fn load(
        schema_id: &str,
        schemas: &dyn SchemaStore,
        bindings: &dyn BindingStore,
        mode: EditorMode,
    ) -> anyhow::Result<Self> {
        let schema = schemas.load_schema(schema_id)?;
        let map = bindings.load_bindings(schema.script_name())?;
        Ok(Self::new(schema_id, schema, map, mode))
    }

    pub fn schema_id(&self) -> &str {
        &self.schema_id
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// The draft schema, including unsaved edits.
    pub fn schema(&self) -> &ToolSchema {
        &self.draft
    }

    pub fn bindings(&self) -> &VariableBindingMap {
        &self.bindings
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn advanced_text(&self) -> Option<&str> {
        match &self.view {
            View::Advanced { text } => Some(text),
            View::Simple => None,
        }
    }

    /// Whether the save control should be enabled.
    pub fn can_save(&self) -> bool {
        !self.read_only && self.state == EditorState::Dirty
    }

    pub fn snapshot(&self) -> EditorSnapshot<'_> {
        EditorSnapshot {
            schema_id: &self.schema_id,
            mode: self.mode,
            read_only: self.read_only,
            state: self.state,
            can_save: self.can_save(),
            advanced: matches!(self.view, View::Advanced { .. }),
            advanced_text: self.advanced_text(),
            schema: &self.draft,
            bindings: &self.bindings,
        }
    }

    fn ensure_editable(&self) -> Result<(), EditError> {
        if self.read_only {
            return Err(EditError::ReadOnly);
        }
        if self.state == EditorState::Saving {
            return Err(EditError::SaveInFlight);
        }
        Ok(())
    }

    /// Structured (card) edits additionally need the simple view.
    fn ensure_structured(&self) -> Result<(), EditError> {
        self.ensure_editable()?;
        if matches!(self.view, View::Advanced { .. }) {
            return Err(EditError::AdvancedViewActive);
        }
        Ok(())
    }

    fn touch(&mut self, changed: bool) -> bool {
        if changed {
            self.state = EditorState::Dirty;
        }
        changed
    }

    /// Add a parameter at the top level (`parent = None`) or under `parent`.
    /// Returns the new field's path.
    pub fn add_parameter(&mut self, parent: Option<&str>) -> Result<Option<String>, EditError> {
        self.ensure_structured()?;
        let added = match parent {
            None => Some(mutate::add_top_level_parameter(&mut self.draft, self.mode)),
            Some(parent) => mutate::add_child_parameter(&mut self.draft, parent, self.mode),
        };
        self.touch(added.is_some());
        Ok(added)
    }

    pub fn delete_parameter(&mut self, path: &str) -> Result<bool, EditError> {
        self.ensure_structured()?;
        let changed = mutate::delete_parameter(&mut self.draft, &mut self.bindings, path);
        Ok(self.touch(changed))
    }

    pub fn rename_parameter(&mut self, path: &str, new_name: &str) -> Result<bool, EditError> {
        self.ensure_structured()?;
        let changed = mutate::rename_parameter(&mut self.draft, &mut self.bindings, path, new_name)?;
        Ok(self.touch(changed))
    }

    /// Toggle requiredness. Refused unless every ancestor is required.
    pub fn toggle_required(&mut self, path: &str) -> Result<Option<bool>, EditError> {
        self.ensure_structured()?;
        if !mutate::required_eligible(&self.draft, path) {
            return Err(EditError::ParentNotRequired(path.to_string()));
        }
        let now = mutate::set_required(&mut self.draft, path);
        self.touch(now.is_some());
        Ok(now)
    }

    pub fn set_type(&mut self, path: &str, param_type: ParamType) -> Result<bool, EditError> {
        self.ensure_structured()?;
        let changed = mutate::set_type(&mut self.draft, &mut self.bindings, path, param_type);
        Ok(self.touch(changed))
    }

    pub fn set_items_type(&mut self, path: &str, param_type: ParamType) -> Result<bool, EditError> {
        self.ensure_structured()?;
        let changed = mutate::set_items_type(&mut self.draft, &mut self.bindings, path, param_type);
        Ok(self.touch(changed))
    }

    pub fn set_enum(&mut self, path: &str, raw: Option<&str>) -> Result<bool, EditError> {
        self.ensure_structured()?;
        let changed = mutate::set_enum(&mut self.draft, path, raw)?;
        Ok(self.touch(changed))
    }

    pub fn set_description(&mut self, path: &str, text: &str) -> Result<bool, EditError> {
        self.ensure_structured()?;
        let changed = mutate::set_description(&mut self.draft, path, text);
        Ok(self.touch(changed))
    }

    pub fn set_binding(&mut self, path: &str, source: &str) -> Result<bool, EditError> {
        self.ensure_structured()?;
        let changed = mutate::set_binding(&self.draft, &mut self.bindings, path, source);
        Ok(self.touch(changed))
    }

    pub fn remove_binding(&mut self, path: &str) -> Result<bool, EditError> {
        self.ensure_structured()?;
        let changed = mutate::remove_binding(&mut self.bindings, path);
        Ok(self.touch(changed))
    }

    pub fn set_tool_name(&mut self, name: &str) -> Result<bool, EditError> {
        self.ensure_structured()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(EditError::EmptyName);
        }
        let changed = self.draft.name != name;
        self.draft.name = name.to_string();
        Ok(self.touch(changed))
    }

    pub fn set_tool_description(&mut self, description: &str) -> Result<bool, EditError> {
        self.ensure_structured()?;
        let changed = self.draft.description != description;
        self.draft.description = description.to_string();
        Ok(self.touch(changed))
    }

    /// Apply a serialized edit. Returns whether anything changed.
    pub fn apply(&mut self, op: EditOp) -> Result<bool, EditError> {
        debug!(?op, "applying edit");
        match op {
            EditOp::AddParameter { parent } => {
                self.add_parameter(parent.as_deref()).map(|p| p.is_some())
            }
            EditOp::DeleteParameter { path } => self.delete_parameter(&path),
            EditOp::RenameParameter { path, new_name } => self.rename_parameter(&path, &new_name),
            EditOp::ToggleRequired { path } => self.toggle_required(&path).map(|r| r.is_some()),
            EditOp::SetType { path, param_type } => self.set_type(&path, param_type),
            EditOp::SetItemsType { path, param_type } => self.set_items_type(&path, param_type),
            EditOp::SetEnum { path, values } => self.set_enum(&path, values.as_deref()),
            EditOp::SetDescription { path, description } => {
                self.set_description(&path, &description)
            }
            EditOp::SetBinding { path, source } => self.set_binding(&path, &source),
            EditOp::RemoveBinding { path } => self.remove_binding(&path),
            EditOp::SetToolName { name } => self.set_tool_name(&name),
            EditOp::SetToolDescription { description } => self.set_tool_description(&description),
        }
    }

    /// Switch to the advanced view, snapshotting the draft as JSON text.
    /// Does nothing if already there.
    pub fn enter_advanced(&mut self) {
        if matches!(self.view, View::Simple) {
            self.view = View::Advanced {
                text: view::serialize_schema(&self.draft),
            };
        }
    }

    /// Replace the advanced-view text. Nothing reaches the draft until the
    /// text is applied.
    pub fn set_advanced_text(&mut self, new_text: impl Into<String>) -> Result<(), EditError> {
        self.ensure_editable()?;
        match &mut self.view {
            View::Advanced { text } => {
                *text = new_text.into();
                Ok(())
            }
            View::Simple => Err(EditError::AdvancedViewInactive),
        }
    }

    /// Parse the advanced-view text into the draft without leaving the view
    /// (the blur behavior). On error the draft is unchanged.
    pub fn apply_advanced(&mut self) -> Result<bool, EditError> {
        let View::Advanced { text } = &self.view else {
            return Err(EditError::AdvancedViewInactive);
        };
        if self.read_only {
            return Ok(false);
        }
        self.ensure_editable()?;
        let patch = view::parse(text)?;
        let changed = patch.apply(&mut self.draft, &mut self.bindings);
        Ok(self.touch(changed))
    }

    /// Apply the advanced-view text and return to the simple view. If the text
    /// does not parse, the view does not switch.
    pub fn leave_advanced(&mut self) -> Result<bool, EditError> {
        if matches!(self.view, View::Simple) {
            return Ok(false);
        }
        let changed = self.apply_advanced()?;
        self.view = View::Simple;
        Ok(changed)
    }

    /// Run the advanced-view text through `optimizer` and replace the text
    /// with the result. The draft is not touched, and on failure neither is
    /// the text.
    pub async fn optimize_json<O: JsonOptimizer>(&mut self, optimizer: &O) -> anyhow::Result<()> {
        self.ensure_editable()?;
        let text = self
            .advanced_text()
            .ok_or(EditError::AdvancedViewInactive)?
            .to_string();
        let optimized = optimizer.optimize(&text).await?;
        self.set_advanced_text(optimized)?;
        Ok(())
    }

    /// Discard the draft and re-seed from the baseline.
    pub fn cancel(&mut self) -> Result<(), EditError> {
        if self.state == EditorState::Saving {
            return Err(EditError::SaveInFlight);
        }
        self.draft = self.baseline.clone();
        self.bindings = self.baseline_bindings.clone();
        self.state = EditorState::Clean;
        self.view = View::Simple;
        Ok(())
    }

    /// Replace the baseline with freshly provided external values and drop
    /// the draft.
    pub fn reseed(&mut self, schema: ToolSchema, bindings: VariableBindingMap) -> Result<(), EditError> {
        if self.state == EditorState::Saving {
            return Err(EditError::SaveInFlight);
        }
        self.bindings_key = schema.script_name().to_string();
        self.baseline = schema;
        self.baseline_bindings = bindings;
        self.cancel()
    }

    /// Binding-store key the next save writes to. Without a `script_id` the
    /// key is the tool name, so it follows a rename in modes that persist it.
    fn binding_key(&self) -> &str {
        if self.mode.persists_name() {
            self.draft.script_name()
        } else {
            self.baseline.script_name()
        }
    }

    /// Diff the draft against the baseline.
    pub fn plan_save(&self) -> SavePlan {
        let name_changed = self.mode.persists_name() && self.draft.name != self.baseline.name;
        let schema_changed = name_changed
            || self.draft.description != self.baseline.description
            || self.draft.fields != self.baseline.fields
            || self.draft.required_params != self.baseline.required_params;

        let script_name = self.binding_key();
        let bindings_changed =
            self.bindings != self.baseline_bindings || script_name != self.bindings_key;

        SavePlan {
            schema_id: self.schema_id.clone(),
            script_name: script_name.to_string(),
            schema: schema_changed.then(|| SchemaPatch {
                name: self.mode.persists_name().then(|| self.draft.name.clone()),
                description: self.draft.description.clone(),
                fields: self.draft.fields.clone(),
                required_params: self.draft.required_params.clone(),
            }),
            bindings: bindings_changed.then(|| self.bindings.clone()),
        }
    }

    /// Enter the saving state and return the writes to perform.
    ///
    /// In the advanced view the text is applied first; a parse failure aborts
    /// the save.
    pub fn begin_save(&mut self) -> Result<SavePlan, EditError> {
        if self.read_only {
            return Err(EditError::ReadOnly);
        }
        if self.state == EditorState::Saving {
            return Err(EditError::SaveInFlight);
        }
        if matches!(self.view, View::Advanced { .. }) {
            self.apply_advanced()?;
        }
        if self.state == EditorState::Clean {
            return Err(EditError::NothingToSave);
        }
        self.state = EditorState::Saving;
        Ok(self.plan_save())
    }

    /// Record the result of the writes in `plan`.
    ///
    /// Each write that succeeded moves into the baseline, so a retry after a
    /// partial failure only pushes what is still pending.
    pub fn finish_save(&mut self, plan: SavePlan, report: SaveReport) -> Result<SaveOutcome, EditError> {
        if self.state != EditorState::Saving {
            return Err(EditError::NoSaveInFlight);
        }
        let schema_written = matches!(report.schema, Some(Ok(())));
        let bindings_written = matches!(report.bindings, Some(Ok(())));

        if schema_written {
            if let Some(patch) = &plan.schema {
                patch.apply_to(&mut self.baseline);
            }
        }
        if bindings_written {
            if let Some(bindings) = plan.bindings {
                self.baseline_bindings = bindings;
                self.bindings_key = plan.script_name;
            }
        }

        if let Some(message) = report.failure_message() {
            self.state = EditorState::Dirty;
            return Err(EditError::SaveFailed(message));
        }

        // The name is not persisted in every mode; the draft is what the
        // caller should cache.
        self.baseline = self.draft.clone();
        self.state = EditorState::Clean;
        info!(
            schema_id = %self.schema_id,
            schema_written,
            bindings_written,
            "schema editor saved"
        );
        Ok(SaveOutcome {
            schema: self.draft.clone(),
            bindings: self.bindings.clone(),
            schema_written,
            bindings_written,
        })
    }

    /// Full save: plan, write both stores, record the result.
    pub fn save(
        &mut self,
        schemas: &dyn SchemaStore,
        bindings: &dyn BindingStore,
    ) -> Result<SaveOutcome, EditError> {
        let plan = self.begin_save()?;
        let report = plan.execute(schemas, bindings);
        self.finish_save(plan, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> SchemaEditor {
        SchemaEditor::new("sch_1", ToolSchema::new("weather"), VariableBindingMap::new(), EditorMode::Tool)
    }

    #[test]
    fn edits_mark_dirty_and_noops_do_not() {
        let mut ed = editor();
        assert_eq!(ed.state(), EditorState::Clean);
        assert!(!ed.delete_parameter("missing").unwrap());
        assert_eq!(ed.state(), EditorState::Clean);

        ed.add_parameter(None).unwrap();
        assert_eq!(ed.state(), EditorState::Dirty);
        assert!(ed.can_save());
    }

    #[test]
    fn read_only_refuses_edits() {
        let mut ed = editor().read_only(true);
        assert!(matches!(ed.add_parameter(None), Err(EditError::ReadOnly)));
        assert!(!ed.can_save());
        assert!(matches!(ed.begin_save(), Err(EditError::ReadOnly)));
    }

    #[test]
    fn toggle_required_is_gated_on_parent() {
        let mut ed = editor();
        ed.add_parameter(None).unwrap();
        ed.set_type("new0", ParamType::Object).unwrap();
        ed.add_parameter(Some("new0")).unwrap();

        assert!(matches!(
            ed.toggle_required("new0.new0"),
            Err(EditError::ParentNotRequired(_))
        ));
        assert_eq!(ed.toggle_required("new0").unwrap(), Some(true));
        assert_eq!(ed.toggle_required("new0.new0").unwrap(), Some(true));
    }

    #[test]
    fn structured_edits_blocked_in_advanced_view() {
        let mut ed = editor();
        ed.enter_advanced();
        assert!(matches!(ed.add_parameter(None), Err(EditError::AdvancedViewActive)));
        ed.leave_advanced().unwrap();
        assert!(ed.add_parameter(None).is_ok());
    }

    #[test]
    fn bad_advanced_text_keeps_view_and_draft() {
        let mut ed = editor();
        ed.enter_advanced();
        ed.set_advanced_text("{ broken").unwrap();
        assert!(matches!(ed.leave_advanced(), Err(EditError::InvalidJson(_))));
        assert!(ed.advanced_text().is_some());
        assert_eq!(ed.schema(), &ToolSchema::new("weather"));
        assert_eq!(ed.state(), EditorState::Clean);
    }

    #[test]
    fn cancel_restores_baseline() {
        let mut ed = editor();
        ed.add_parameter(None).unwrap();
        ed.enter_advanced();
        ed.cancel().unwrap();
        assert!(ed.schema().fields.is_empty());
        assert_eq!(ed.state(), EditorState::Clean);
        assert!(ed.advanced_text().is_none());
    }

    #[test]
    fn saving_state_blocks_edits_and_second_save() {
        let mut ed = editor();
        ed.add_parameter(None).unwrap();
        let plan = ed.begin_save().unwrap();
        assert_eq!(ed.state(), EditorState::Saving);
        assert!(!ed.can_save());
        assert!(matches!(ed.begin_save(), Err(EditError::SaveInFlight)));
        assert!(matches!(ed.add_parameter(None), Err(EditError::SaveInFlight)));
        assert!(matches!(ed.cancel(), Err(EditError::SaveInFlight)));

        let report = SaveReport {
            schema: Some(Ok(())),
            bindings: None,
        };
        let outcome = ed.finish_save(plan, report).unwrap();
        assert!(outcome.schema_written);
        assert_eq!(ed.state(), EditorState::Clean);
    }

    #[test]
    fn finish_without_begin_is_refused() {
        let mut ed = editor();
        ed.add_parameter(None).unwrap();
        let plan = ed.plan_save();
        let report = SaveReport {
            schema: Some(Ok(())),
            bindings: None,
        };
        assert!(matches!(ed.finish_save(plan, report), Err(EditError::NoSaveInFlight)));
        assert_eq!(ed.state(), EditorState::Dirty);

        // The baseline did not move, so cancel still discards the edit.
        ed.cancel().unwrap();
        assert!(ed.schema().fields.is_empty());
    }

    #[test]
    fn failed_report_returns_to_dirty() {
        let mut ed = editor();
        ed.add_parameter(None).unwrap();
        let plan = ed.begin_save().unwrap();
        let report = SaveReport::failed(&plan, "save task panicked");

        assert!(matches!(ed.finish_save(plan, report), Err(EditError::SaveFailed(_))));
        assert_eq!(ed.state(), EditorState::Dirty);
        assert!(ed.can_save());
        ed.cancel().unwrap();
        assert_eq!(ed.state(), EditorState::Clean);
    }

    #[test]
    fn clean_editor_has_nothing_to_save() {
        let mut ed = editor();
        assert!(matches!(ed.begin_save(), Err(EditError::NothingToSave)));
    }

    #[test]
    fn agent_mode_does_not_push_name() {
        let mut ed = SchemaEditor::new(
            "sch_2",
            ToolSchema::new("vars"),
            VariableBindingMap::new(),
            EditorMode::AgentVariables,
        );
        ed.set_tool_name("renamed").unwrap();
        assert!(ed.plan_save().is_empty());

        ed.add_parameter(None).unwrap();
        let patch = ed.plan_save().schema.unwrap();
        assert!(patch.name.is_none());
    }
}
