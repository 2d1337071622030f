//! Typed errors surfaced to the person editing a schema.

/// A rejected edit or save. The schema is left unchanged whenever one of
/// these is returned from a mutation.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("name `{0}` must not contain '.'")]
    InvalidName(String),

    #[error("a parameter named `{0}` already exists at this level")]
    NameTaken(String),

    #[error("enum values must be a JSON array literal, e.g. [\"a\", \"b\"]")]
    InvalidEnum,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("`{0}` cannot change requiredness while a parent is optional")]
    ParentNotRequired(String),

    #[error("switch back to the simple view before editing fields")]
    AdvancedViewActive,

    #[error("the advanced view is not open")]
    AdvancedViewInactive,

    #[error("editor is read-only")]
    ReadOnly,

    #[error("a save is already in progress")]
    SaveInFlight,

    #[error("no save is in progress")]
    NoSaveInFlight,

    #[error("there are no unsaved changes")]
    NothingToSave,

    #[error("no editor is open for `{0}`")]
    NotOpen(String),

    #[error("save failed: {0}")]
    SaveFailed(String),
}
