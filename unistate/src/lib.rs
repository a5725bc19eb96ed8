//! unistate: one state cell, ordered reducers, middleware and subscribers
//!
//! All state changes go through dispatched actions. Reducers are bound to
//! action kinds and run in registration order; before-middleware may rewrite
//! the action, after-middleware observes each transition, and subscribers are
//! told once every dispatch has completed.
//!
//! # Example
//! ```
//! use serde_json::{json, Value};
//! use unistate::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! enum Counter {
//!     Add(i64),
//!     Reset,
//! }
//!
//! let mut store = Store::<Counter>::new();
//! store
//!     .reduce(CounterKind::Add, Some("count"), |count: &Value, action: &Counter| {
//!         let Counter::Add(n) = action else { return None };
//!         Some(json!(count.as_i64().unwrap_or(0) + n))
//!     })
//!     .reduce_and_merge(CounterKind::Reset, None, |_: &Value, _: &Counter, _: &Value| {
//!         Some(json!({"count": 0}))
//!     });
//!
//! store.dispatch(Counter::Add(4)).unwrap();
//! assert_eq!(store.state(), &json!({"count": 4}));
//!
//! store.dispatch(Counter::Reset).unwrap();
//! assert_eq!(store.state(), &json!({"count": 0}));
//! ```

// Re-export everything from core
pub use unistate_core::*;

// Re-export derive macros
pub use unistate_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    // Traits and derive
    pub use unistate_core::{Action, ActionSummary, Middleware};
    pub use unistate_macros::Action;

    // Store
    pub use unistate_core::{store_accessor, Store, StoreAccessor, StoreError, SubscriberId};

    // Debug
    pub use unistate_core::debug::{ActionLogConfig, ActionLoggerConfig, ActionLoggerMiddleware};
}
