//! The parameter schema tree and everything that edits it.
//!
//! - [`types`]: the wire data model
//! - [`path`]: dotted-path resolution shared by every operation
//! - [`mutate`]: structural edits (add, delete, rename, retype, enum, required)
//! - [`bindings`]: keeping the binding side table in step with the tree
//! - [`view`]: the advanced-view JSON serializer/parser pair
//! - [`validate`]: invariant checks for externally supplied schemas

pub mod bindings;
pub mod mutate;
pub mod path;
pub mod types;
pub mod validate;
pub mod view;

pub use types::{EditorMode, ParamType, ParameterMap, ParameterNode, ToolSchema, VariableBindingMap};
