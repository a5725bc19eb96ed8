//! Centralized state store with ordered reducers, middleware and subscribers

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::action::Action;
use crate::error::{type_name, StoreError};
use crate::merge::MergeStrategy;
use crate::middleware::{AfterFn, BeforeFn, Middleware, MiddlewareChain};
use crate::observer::{ObserverRegistry, SubscriberId};
use crate::reducer::{Reducer, ReducerTable};

/// Single-cell state container driven by dispatched actions
///
/// The state is a JSON object. It is only ever replaced wholesale inside
/// [`dispatch`](Store::dispatch), so a [`snapshot`](Store::snapshot) taken
/// earlier is never affected by later dispatches.
///
/// `reduce`, `reduce_and_merge`, `when_merging` and `subscribe` each have a
/// `try_` twin taking an `Option` of the function; `None` fails with
/// [`StoreError::MissingFunction`].
///
/// # Example
/// ```
/// use serde_json::{json, Value};
/// use unistate_core::{Action, Store};
///
/// #[derive(Clone, Debug)]
/// enum Counter {
///     Add(i64),
/// }
///
/// impl Action for Counter {
///     type Kind = ();
///     fn kind(&self) -> Self::Kind {}
///     fn name(&self) -> &'static str {
///         "Add"
///     }
/// }
///
/// let mut store = Store::<Counter>::new();
/// store
///     .reduce((), Some("count"), |count: &Value, action: &Counter| {
///         let Counter::Add(n) = action;
///         Some(json!(count.as_i64().unwrap_or(0) + n))
///     });
///
/// store.dispatch(Counter::Add(2)).unwrap();
/// store.dispatch(Counter::Add(3)).unwrap();
/// assert_eq!(store.state(), &json!({"count": 5}));
/// ```
pub struct Store<A: Action> {
    state: Arc<Value>,
    reducers: ReducerTable<A>,
    merge: MergeStrategy,
    middleware: MiddlewareChain<A>,
    observers: ObserverRegistry,
}

impl<A: Action> fmt::Debug for Store<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("reducers", &self.reducers)
            .field("merge", &self.merge)
            .field("middleware", &self.middleware)
            .field("observers", &self.observers)
            .finish()
    }
}

impl<A: Action> Default for Store<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> Store<A> {
    /// Create a store with an empty object as its state
    pub fn new() -> Self {
        Self::with_state(Map::new())
    }

    /// Create a store with the given initial state
    pub fn with_state(state: Map<String, Value>) -> Self {
        Self {
            state: Arc::new(Value::Object(state)),
            reducers: ReducerTable::new(),
            merge: MergeStrategy::new(),
            middleware: MiddlewareChain::new(),
            observers: ObserverRegistry::new(),
        }
    }

    /// Register an auto-merge reducer for `kind`
    ///
    /// The reducer sees `state[state_key]` (or the whole state) and the
    /// action. A `Some` result is combined into the state by the merge
    /// strategy.
    pub fn reduce<F>(&mut self, kind: A::Kind, state_key: Option<&str>, reducer: F) -> &mut Self
    where
        F: Fn(&Value, &A) -> Option<Value> + 'static,
    {
        self.reducers.push(kind, state_key, Reducer::auto(reducer));
        self
    }

    /// [`reduce`](Self::reduce) with a possibly absent reducer
    pub fn try_reduce<F>(
        &mut self,
        kind: A::Kind,
        state_key: Option<&str>,
        reducer: Option<F>,
    ) -> Result<&mut Self, StoreError>
    where
        F: Fn(&Value, &A) -> Option<Value> + 'static,
    {
        let reducer = reducer.ok_or(StoreError::missing("reduce"))?;
        Ok(self.reduce(kind, state_key, reducer))
    }

    /// Register a manual-merge reducer for `kind`
    ///
    /// The reducer sees its slice, the action and the full state. A `Some`
    /// result replaces the entire state and must be an object.
    pub fn reduce_and_merge<F>(
        &mut self,
        kind: A::Kind,
        state_key: Option<&str>,
        reducer: F,
    ) -> &mut Self
    where
        F: Fn(&Value, &A, &Value) -> Option<Value> + 'static,
    {
        self.reducers.push(kind, state_key, Reducer::manual(reducer));
        self
    }

    /// [`reduce_and_merge`](Self::reduce_and_merge) with a possibly absent reducer
    pub fn try_reduce_and_merge<F>(
        &mut self,
        kind: A::Kind,
        state_key: Option<&str>,
        reducer: Option<F>,
    ) -> Result<&mut Self, StoreError>
    where
        F: Fn(&Value, &A, &Value) -> Option<Value> + 'static,
    {
        let reducer = reducer.ok_or(StoreError::missing("reduce_and_merge"))?;
        Ok(self.reduce_and_merge(kind, state_key, reducer))
    }

    /// Install the store-wide custom merge function
    ///
    /// Replaces any previously installed one. It is used for every
    /// auto-merge reducer, whatever its action kind or state key.
    pub fn when_merging<F>(&mut self, merge: F) -> &mut Self
    where
        F: Fn(&Value, Value, Option<&str>) -> Value + 'static,
    {
        self.merge.set(Box::new(merge));
        self
    }

    /// [`when_merging`](Self::when_merging) with a possibly absent function
    pub fn try_when_merging<F>(&mut self, merge: Option<F>) -> Result<&mut Self, StoreError>
    where
        F: Fn(&Value, Value, Option<&str>) -> Value + 'static,
    {
        let merge = merge.ok_or(StoreError::missing("when_merging"))?;
        Ok(self.when_merging(merge))
    }

    /// Append a before-function
    pub fn before<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Store<A>, &A) -> Option<A> + 'static,
    {
        self.middleware.push_before(Some(Box::new(f) as BeforeFn<A>));
        self
    }

    /// Append an after-function
    pub fn after<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Value, &Value, &A) + 'static,
    {
        self.middleware.push_after(Some(Box::new(f) as AfterFn<A>));
        self
    }

    /// Register both hooks of `middleware`
    ///
    /// Returns a shared handle so the caller can inspect it later.
    pub fn with_middleware<M: Middleware<A> + 'static>(&mut self, middleware: M) -> Rc<M> {
        let middleware = Rc::new(middleware);
        self.middleware.push(Rc::clone(&middleware));
        middleware
    }

    /// Register a callback run after every dispatch
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriberId
    where
        F: Fn() + 'static,
    {
        self.observers.insert(Box::new(callback))
    }

    /// [`subscribe`](Self::subscribe) with a possibly absent callback
    pub fn try_subscribe<F>(&mut self, callback: Option<F>) -> Result<SubscriberId, StoreError>
    where
        F: Fn() + 'static,
    {
        let callback = callback.ok_or(StoreError::missing("subscribe"))?;
        Ok(self.subscribe(callback))
    }

    /// Remove a subscriber; unknown ids are ignored
    pub fn unsubscribe(&mut self, id: &SubscriberId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Run `action` through the pipeline
    ///
    /// 1. before-functions transform the action
    /// 2. reducers bound to the resulting kind run in registration order,
    ///    each seeing the state left by the previous one
    /// 3. after-functions observe `(previous, final, action)`
    /// 4. every subscriber is notified
    ///
    /// An error stops the pipeline. State replaced by earlier reducers in
    /// the same dispatch is kept.
    pub fn dispatch(&mut self, action: A) -> Result<(), StoreError> {
        let previous = Arc::clone(&self.state);

        let store: &Self = self;
        let action = store.middleware.run_before(store, action);

        for binding in self.reducers.lookup(action.kind()) {
            let state: &Value = &self.state;
            let slice = binding.slice(state);
            let next = match binding.reducer() {
                Reducer::Auto(reducer) => match reducer(slice, &action) {
                    Some(result) => self.merge.resolve(state, result, binding.state_key())?,
                    None => continue,
                },
                Reducer::Manual(reducer) => match reducer(slice, &action, state) {
                    Some(result) => ensure_object(result)?,
                    None => continue,
                },
            };
            self.state = Arc::new(next);
        }

        self.middleware.run_after(&previous, &self.state, &action);
        self.observers.notify_all();
        Ok(())
    }

    /// Current state
    pub fn state(&self) -> &Value {
        &self.state
    }

    /// Shared handle to the current state value
    pub fn snapshot(&self) -> Arc<Value> {
        Arc::clone(&self.state)
    }

    /// Top-level entry of the current state
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }

    /// Number of reducers bound to `kind`
    pub fn reducer_count(&self, kind: A::Kind) -> usize {
        self.reducers.len(kind)
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }

    /// Whether a custom merge function is installed
    pub fn has_custom_merge(&self) -> bool {
        self.merge.is_custom()
    }
}

fn ensure_object(value: Value) -> Result<Value, StoreError> {
    if value.is_object() {
        Ok(value)
    } else {
        Err(StoreError::StateNotObject {
            found: type_name(&value),
        })
    }
}
