//! Before/after middleware chain around reducer execution

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::action::Action;
use crate::store::Store;

/// Runs before reducers; `Some(action)` replaces the action downstream
pub type BeforeFn<A> = Box<dyn Fn(&Store<A>, &A) -> Option<A>>;

/// Runs after reducers with `(previous_state, final_state, action)`
pub type AfterFn<A> = Box<dyn Fn(&Value, &Value, &A)>;

/// Middleware trait for intercepting actions
///
/// Implement this trait to bundle a before and an after hook that share
/// state, for example a logger. Register it with
/// [`Store::with_middleware`](crate::Store::with_middleware).
pub trait Middleware<A: Action> {
    /// Called before reducers run. Return `Some` to substitute the action.
    fn before(&self, _store: &Store<A>, _action: &A) -> Option<A> {
        None
    }

    /// Called after every reducer for the action has run
    fn after(&self, _previous: &Value, _current: &Value, _action: &A) {}
}

/// Ordered before-transforms and after-observers
///
/// There is no removal: once registered, a function runs on every dispatch.
pub struct MiddlewareChain<A: Action> {
    before: Vec<BeforeFn<A>>,
    after: Vec<AfterFn<A>>,
}

impl<A: Action> fmt::Debug for MiddlewareChain<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .finish()
    }
}

impl<A: Action> Default for MiddlewareChain<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> MiddlewareChain<A> {
    /// Create an empty chain
    pub fn new() -> Self {
        Self {
            before: Vec::new(),
            after: Vec::new(),
        }
    }

    /// Append a before-function; `None` is ignored
    pub fn push_before(&mut self, f: Option<BeforeFn<A>>) {
        if let Some(f) = f {
            self.before.push(f);
        }
    }

    /// Append an after-function; `None` is ignored
    pub fn push_after(&mut self, f: Option<AfterFn<A>>) {
        if let Some(f) = f {
            self.after.push(f);
        }
    }

    /// Register both hooks of a [`Middleware`], sharing one instance
    pub fn push<M: Middleware<A> + 'static>(&mut self, middleware: Rc<M>) {
        let before = Rc::clone(&middleware);
        self.before
            .push(Box::new(move |store: &Store<A>, action: &A| {
                before.before(store, action)
            }));
        self.after.push(Box::new(move |previous: &Value, current: &Value, action: &A| {
            middleware.after(previous, current, action)
        }));
    }

    /// Fold `action` through the before-functions in registration order
    pub fn run_before(&self, store: &Store<A>, action: A) -> A {
        self.before
            .iter()
            .fold(action, |current, f| f(store, &current).unwrap_or(current))
    }

    /// Call every after-function in registration order
    pub fn run_after(&self, previous: &Value, current: &Value, action: &A) {
        for f in &self.after {
            f(previous, current, action);
        }
    }

    /// Number of before-functions
    pub fn before_len(&self) -> usize {
        self.before.len()
    }

    /// Number of after-functions
    pub fn after_len(&self) -> usize {
        self.after.len()
    }
}
