//! Parameter schema editing for LLM tools.
//!
//! A tool's parameters form a recursive tree of typed fields (string, number,
//! boolean, object, array) with per-level required sets. Alongside the tree
//! sits a path-keyed map of variable bindings: fields whose values come from
//! an external source instead of the model.
//!
//! | Concept | Type |
//! |---------|------|
//! | Parameter tree | [`schema::ToolSchema`], [`schema::ParameterNode`] |
//! | Bindings | [`schema::VariableBindingMap`] (`"address.city"` -> source) |
//! | Editing session | [`editor::SchemaEditor`] |
//! | Open sessions by modal id | [`editor::ModalRegistry`] |
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: SQLite database initialization, schema, migrations, and health checks
//! - [`catalog`]: Schema and binding stores (traits plus the SQLite implementation)
//! - [`schema`]: The tree model, path resolution, mutators, and the JSON view codec
//! - [`editor`]: Editing sessions and the save/discard state machine
//! - [`optimize`]: The "optimize JSON" helper for the advanced view
//! - [`error`]: User-facing edit errors

pub mod catalog;
pub mod config;
pub mod db;
pub mod editor;
pub mod error;
pub mod optimize;
pub mod schema;
