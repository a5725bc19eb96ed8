//! Core types for unistate
//!
//! A single state cell that only changes through dispatched actions, in the
//! spirit of Redux.
//!
//! # Core Concepts
//!
//! - **Action**: a value whose *kind* selects which reducers run
//! - **Reducer**: a function from a state slice and an action to a new value
//! - **Merge strategy**: how a reducer's result is folded back into the state
//! - **Middleware**: before-functions that may rewrite the action, and
//!   after-functions that observe each transition
//! - **Subscribers**: callbacks notified after every dispatch
//!
//! # Basic Example
//!
//! ```ignore
//! use unistate::prelude::*;
//! use serde_json::{json, Value};
//!
//! #[derive(Action, Clone, Debug)]
//! enum Todo {
//!     Add(String),
//!     Clear,
//! }
//!
//! let mut store = Store::new();
//! store
//!     .reduce(TodoKind::Add, Some("items"), |items: &Value, action: &Todo| {
//!         let Todo::Add(text) = action else { return None };
//!         let mut items = items.as_array().cloned().unwrap_or_default();
//!         items.push(json!(text));
//!         Some(Value::Array(items))
//!     })
//!     .reduce_and_merge(TodoKind::Clear, None, |_: &Value, _: &Todo, _: &Value| {
//!         Some(json!({}))
//!     });
//!
//! store.subscribe(|| println!("state changed"));
//! store.dispatch(Todo::Add("write docs".into()))?;
//! ```
//!
//! # Dispatch Pipeline
//!
//! Each [`Store::dispatch`] call:
//!
//! 1. folds the action through the before-functions
//! 2. runs every reducer bound to the resulting action kind, in registration
//!    order, each one seeing the state left by the previous one
//! 3. calls the after-functions with the previous and final state
//! 4. notifies every subscriber
//!
//! Auto-merge reducers (`reduce`) return a value that is merged into the
//! state: set under their state key, or overlaid onto the whole state. A
//! store-wide custom merge function (`when_merging`) replaces that rule.
//! Manual reducers (`reduce_and_merge`) return the complete new state.

pub mod accessor;
pub mod action;
pub mod debug;
pub mod error;
pub mod merge;
pub mod middleware;
pub mod observer;
pub mod reducer;
pub mod store;
pub mod testing;

// Core trait exports
pub use action::{Action, ActionSummary};

// Store exports
pub use accessor::StoreAccessor;
pub use error::StoreError;
pub use merge::{default_merge, MergeFn, MergeStrategy};
pub use middleware::{AfterFn, BeforeFn, Middleware, MiddlewareChain};
pub use observer::{ObserverFn, ObserverRegistry, SubscriberId};
pub use reducer::{AutoReducer, ManualReducer, Reducer, ReducerBinding, ReducerTable};
pub use store::Store;

// Testing exports
pub use testing::{Transition, TransitionRecorder};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::accessor::StoreAccessor;
    pub use crate::action::{Action, ActionSummary};
    pub use crate::debug::{ActionLogConfig, ActionLoggerConfig, ActionLoggerMiddleware};
    pub use crate::error::StoreError;
    pub use crate::middleware::Middleware;
    pub use crate::observer::SubscriberId;
    pub use crate::store::Store;
    pub use crate::store_accessor;
}
