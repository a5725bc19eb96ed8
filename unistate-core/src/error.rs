//! Errors raised by store registration and dispatch

use serde_json::Value;
use thiserror::Error;

/// Errors produced by the store.
///
/// Panics raised inside user callbacks are not represented here: they unwind
/// straight through [`Store::dispatch`](crate::Store::dispatch) to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A registration that requires a function was given none.
    #[error("`{operation}` requires a function")]
    MissingFunction { operation: &'static str },

    /// The default merge was asked to overlay a non-object onto the state.
    #[error("cannot merge a {found} into the state without a state key")]
    MergeNotObject { found: &'static str },

    /// A reducer or merge function tried to install a non-object state.
    #[error("state must be an object, got a {found}")]
    StateNotObject { found: &'static str },

    /// The accessor slot is already borrowed by an in-progress call.
    #[error("store accessor is in use by an in-progress call")]
    AccessorBusy,
}

impl StoreError {
    pub(crate) fn missing(operation: &'static str) -> Self {
        Self::MissingFunction { operation }
    }
}

/// Name of a JSON value's type, for error messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
