//! Reducer bindings and the per-kind reducer table

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::action::Action;
use crate::error::StoreError;

static NULL: Value = Value::Null;

/// Reducer whose result is merged into the state by the merge strategy
///
/// Receives the binding's state slice and the action. Returning `None` leaves
/// the state untouched.
pub type AutoReducer<A> = Box<dyn Fn(&Value, &A) -> Option<Value>>;

/// Reducer whose result replaces the whole state
///
/// Receives the binding's state slice, the action and the full current state.
pub type ManualReducer<A> = Box<dyn Fn(&Value, &A, &Value) -> Option<Value>>;

/// A registered reducer function
pub enum Reducer<A> {
    /// Result goes through the store's merge strategy
    Auto(AutoReducer<A>),
    /// Result becomes the entire new state
    Manual(ManualReducer<A>),
}

impl<A> Reducer<A> {
    /// Wrap an auto-merge reducer
    pub fn auto<F>(f: F) -> Self
    where
        F: Fn(&Value, &A) -> Option<Value> + 'static,
    {
        Self::Auto(Box::new(f))
    }

    /// Wrap a manual-merge reducer
    pub fn manual<F>(f: F) -> Self
    where
        F: Fn(&Value, &A, &Value) -> Option<Value> + 'static,
    {
        Self::Manual(Box::new(f))
    }

    /// Whether the result of this reducer is merged by the merge strategy
    pub fn is_auto_merge(&self) -> bool {
        matches!(self, Self::Auto(_))
    }
}

impl<A> fmt::Debug for Reducer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto(_) => f.write_str("Reducer::Auto"),
            Self::Manual(_) => f.write_str("Reducer::Manual"),
        }
    }
}

/// One reducer registered for an action kind
#[derive(Debug)]
pub struct ReducerBinding<A> {
    state_key: Option<String>,
    reducer: Reducer<A>,
}

impl<A> ReducerBinding<A> {
    /// Create a binding, optionally scoped to a top-level state key
    pub fn new(state_key: Option<&str>, reducer: Reducer<A>) -> Self {
        Self {
            state_key: state_key.map(str::to_owned),
            reducer,
        }
    }

    /// The state key this binding is scoped to, if any
    pub fn state_key(&self) -> Option<&str> {
        self.state_key.as_deref()
    }

    /// Whether the result is merged by the merge strategy
    pub fn auto_merge(&self) -> bool {
        self.reducer.is_auto_merge()
    }

    /// The reducer function
    pub fn reducer(&self) -> &Reducer<A> {
        &self.reducer
    }

    /// The part of `state` this binding operates on.
    ///
    /// A missing key yields `Null`.
    pub fn slice<'s>(&self, state: &'s Value) -> &'s Value {
        match &self.state_key {
            Some(key) => state.get(key).unwrap_or(&NULL),
            None => state,
        }
    }
}

/// Maps action kinds to their ordered reducer bindings
///
/// Bindings for a kind run in the order they were registered.
pub struct ReducerTable<A: Action> {
    bindings: HashMap<A::Kind, Vec<ReducerBinding<A>>>,
}

impl<A: Action> fmt::Debug for ReducerTable<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReducerTable")
            .field("kinds", &self.bindings.len())
            .field("bindings", &self.bindings.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}

impl<A: Action> Default for ReducerTable<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> ReducerTable<A> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Append a binding for `kind`
    ///
    /// Fails with [`StoreError::MissingFunction`] if `reducer` is `None`.
    pub fn register(
        &mut self,
        kind: A::Kind,
        state_key: Option<&str>,
        reducer: Option<Reducer<A>>,
    ) -> Result<(), StoreError> {
        let reducer = reducer.ok_or(StoreError::missing("register"))?;
        self.push(kind, state_key, reducer);
        Ok(())
    }

    /// Infallible form of [`register`](Self::register)
    pub fn push(&mut self, kind: A::Kind, state_key: Option<&str>, reducer: Reducer<A>) {
        self.bindings
            .entry(kind)
            .or_default()
            .push(ReducerBinding::new(state_key, reducer));
    }

    /// Ordered bindings for `kind`; empty if none are registered
    pub fn lookup(&self, kind: A::Kind) -> &[ReducerBinding<A>] {
        self.bindings.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of bindings registered for `kind`
    pub fn len(&self, kind: A::Kind) -> usize {
        self.lookup(kind).len()
    }

    /// Whether no bindings are registered at all
    pub fn is_empty(&self) -> bool {
        self.bindings.values().all(Vec::is_empty)
    }
}
