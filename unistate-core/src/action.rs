//! Action trait for type-safe state transitions

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for actions that can be dispatched to the store
///
/// Actions describe an intent to change state. Each action has a *kind*: a
/// small `Copy` token that selects which reducer bindings run. Two actions of
/// the same kind always route to the same bindings, whatever their payload.
///
/// Use `#[derive(Action)]` from `unistate-macros` to generate the kind enum
/// and both methods for an action enum.
pub trait Action: Clone + Debug + 'static {
    /// Token identifying the action kind, used as the reducer table key
    type Kind: Copy + Eq + Hash + Debug + 'static;

    /// Get the kind of this action
    fn kind(&self) -> Self::Kind;

    /// Get the action name for logging and filtering
    fn name(&self) -> &'static str;
}

/// Extension trait for one-line action summaries in logs
///
/// The default implementation uses the `Debug` representation. Override it
/// for actions that carry large payloads.
pub trait ActionSummary: Action {
    /// One-line summary of the action
    fn summary(&self) -> String {
        format!("{:?}", self)
    }
}
