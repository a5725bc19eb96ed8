//! Test utilities for unistate stores
//!
//! - [`TransitionRecorder`]: middleware that records every dispatch
//! - Assertion macros for checking which actions reached the reducers
//!
//! # Example
//!
//! ```ignore
//! use unistate::testing::TransitionRecorder;
//! use unistate::assert_dispatched;
//!
//! let recorder = store.with_middleware(TransitionRecorder::new());
//! store.dispatch(Action::Increment)?;
//!
//! assert_dispatched!(recorder.actions(), Action::Increment);
//! assert_eq!(recorder.last().unwrap().current["count"], 1);
//! ```

use std::cell::RefCell;
use std::fmt;

use serde_json::Value;

use crate::action::Action;
use crate::middleware::Middleware;

/// One completed dispatch as seen by the after-chain
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<A> {
    /// State before any reducer ran
    pub previous: Value,
    /// State after the last reducer ran
    pub current: Value,
    /// Action as produced by the before-chain
    pub action: A,
}

impl<A> Transition<A> {
    /// Whether the dispatch changed the state
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// After-middleware that records transitions for later assertions
///
/// Register it with [`Store::with_middleware`](crate::Store::with_middleware)
/// and keep the returned handle.
pub struct TransitionRecorder<A> {
    transitions: RefCell<Vec<Transition<A>>>,
}

impl<A: fmt::Debug> fmt::Debug for TransitionRecorder<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionRecorder")
            .field("transitions", &self.transitions.borrow())
            .finish()
    }
}

impl<A> Default for TransitionRecorder<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> TransitionRecorder<A> {
    pub fn new() -> Self {
        Self {
            transitions: RefCell::new(Vec::new()),
        }
    }

    /// Number of recorded dispatches
    pub fn len(&self) -> usize {
        self.transitions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.borrow().is_empty()
    }

    /// Take all recorded transitions, leaving the recorder empty
    pub fn drain(&self) -> Vec<Transition<A>> {
        std::mem::take(&mut *self.transitions.borrow_mut())
    }
}

impl<A: Clone> TransitionRecorder<A> {
    /// Recorded transitions, oldest first
    pub fn transitions(&self) -> Vec<Transition<A>> {
        self.transitions.borrow().clone()
    }

    /// Actions that reached the reducers, oldest first
    pub fn actions(&self) -> Vec<A> {
        self.transitions
            .borrow()
            .iter()
            .map(|t| t.action.clone())
            .collect()
    }

    /// Most recent transition
    pub fn last(&self) -> Option<Transition<A>> {
        self.transitions.borrow().last().cloned()
    }
}

impl<A: Action> Middleware<A> for TransitionRecorder<A> {
    fn after(&self, previous: &Value, current: &Value, action: &A) {
        self.transitions.borrow_mut().push(Transition {
            previous: previous.clone(),
            current: current.clone(),
            action: action.clone(),
        });
    }
}

/// Assert that an action matching a pattern was dispatched.
///
/// # Example
///
/// ```ignore
/// assert_dispatched!(recorder.actions(), Action::SetValue(42));
/// assert_dispatched!(recorder.actions(), Action::SetValue(n) if n > 40);
/// ```
#[macro_export]
macro_rules! assert_dispatched {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` to be dispatched, but got: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Assert that no action matching a pattern was dispatched.
#[macro_export]
macro_rules! assert_not_dispatched {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` NOT to be dispatched, but it was: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Find the first dispatched action matching a pattern.
#[macro_export]
macro_rules! find_dispatched {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().find(|a| matches!(a, $pattern $(if $guard)?))
    };
}

/// Count dispatched actions matching a pattern.
#[macro_export]
macro_rules! count_dispatched {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().filter(|a| matches!(a, $pattern $(if $guard)?)).count()
    };
}
