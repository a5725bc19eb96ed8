//! Single-slot store accessor for application-wide stores
//!
//! [`StoreAccessor`] owns at most one [`Store`]. It builds the store lazily on
//! first use and forwards a fixed set of typed operations to it. Declare a
//! per-thread instance with [`store_accessor!`](crate::store_accessor):
//!
//! ```
//! use serde_json::{json, Value};
//! use unistate_core::{store_accessor, Action};
//!
//! #[derive(Clone, Debug)]
//! struct Ping;
//!
//! impl Action for Ping {
//!     type Kind = ();
//!     fn kind(&self) -> Self::Kind {}
//!     fn name(&self) -> &'static str {
//!         "Ping"
//!     }
//! }
//!
//! store_accessor!(static APP: Ping;);
//!
//! APP.with(|app| {
//!     app.reduce((), Some("pings"), |n: &Value, _: &Ping| {
//!         Some(json!(n.as_u64().unwrap_or(0) + 1))
//!     })
//!     .unwrap();
//!     app.dispatch(Ping).unwrap();
//!     assert_eq!(*app.snapshot().unwrap(), json!({"pings": 1}));
//! });
//! ```
//!
//! The slot is a `RefCell`. Use from inside a running dispatch on the same
//! accessor (for example from a subscriber) fails with
//! [`StoreError::AccessorBusy`]. The accessor is not `Sync`; sharing one
//! across threads needs external locking and is not supported here.

use std::cell::{RefCell, RefMut};
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::action::Action;
use crate::error::StoreError;
use crate::observer::SubscriberId;
use crate::store::Store;

/// Lazily constructed, replaceable slot holding one [`Store`]
pub struct StoreAccessor<A: Action> {
    slot: RefCell<Option<Store<A>>>,
}

impl<A: Action> fmt::Debug for StoreAccessor<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreAccessor")
            .field("slot", &self.slot)
            .finish()
    }
}

impl<A: Action> Default for StoreAccessor<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> StoreAccessor<A> {
    /// Create an empty accessor; the store is built on first use
    pub const fn new() -> Self {
        Self {
            slot: RefCell::new(None),
        }
    }

    fn borrow_slot(&self) -> Result<RefMut<'_, Option<Store<A>>>, StoreError> {
        self.slot.try_borrow_mut().map_err(|_| StoreError::AccessorBusy)
    }

    /// Borrow the current store, constructing an empty one if needed
    pub fn instance(&self) -> Result<RefMut<'_, Store<A>>, StoreError> {
        let slot = self.borrow_slot()?;
        Ok(RefMut::map(slot, |slot| slot.get_or_insert_with(Store::new)))
    }

    /// Run `f` against the current store
    pub fn with_store<R>(&self, f: impl FnOnce(&mut Store<A>) -> R) -> Result<R, StoreError> {
        let mut store = self.instance()?;
        Ok(f(&mut store))
    }

    /// Whether a store has been constructed
    pub fn is_initialized(&self) -> bool {
        match self.slot.try_borrow() {
            Ok(slot) => slot.is_some(),
            Err(_) => true,
        }
    }

    /// Drop the current store; the next access builds a fresh empty one
    pub fn reset(&self) -> Result<(), StoreError> {
        *self.borrow_slot()? = None;
        Ok(())
    }

    /// Replace the current store with a new one seeded with `state`
    pub fn with_state(&self, state: Map<String, Value>) -> Result<(), StoreError> {
        *self.borrow_slot()? = Some(Store::with_state(state));
        Ok(())
    }

    /// Forward to [`Store::reduce`]
    pub fn reduce<F>(
        &self,
        kind: A::Kind,
        state_key: Option<&str>,
        reducer: F,
    ) -> Result<(), StoreError>
    where
        F: Fn(&Value, &A) -> Option<Value> + 'static,
    {
        self.with_store(|store| {
            store.reduce(kind, state_key, reducer);
        })
    }

    /// Forward to [`Store::try_reduce`]
    pub fn try_reduce<F>(
        &self,
        kind: A::Kind,
        state_key: Option<&str>,
        reducer: Option<F>,
    ) -> Result<(), StoreError>
    where
        F: Fn(&Value, &A) -> Option<Value> + 'static,
    {
        self.with_store(|store| store.try_reduce(kind, state_key, reducer).map(drop))?
    }

    /// Forward to [`Store::reduce_and_merge`]
    pub fn reduce_and_merge<F>(
        &self,
        kind: A::Kind,
        state_key: Option<&str>,
        reducer: F,
    ) -> Result<(), StoreError>
    where
        F: Fn(&Value, &A, &Value) -> Option<Value> + 'static,
    {
        self.with_store(|store| {
            store.reduce_and_merge(kind, state_key, reducer);
        })
    }

    /// Forward to [`Store::try_reduce_and_merge`]
    pub fn try_reduce_and_merge<F>(
        &self,
        kind: A::Kind,
        state_key: Option<&str>,
        reducer: Option<F>,
    ) -> Result<(), StoreError>
    where
        F: Fn(&Value, &A, &Value) -> Option<Value> + 'static,
    {
        self.with_store(|store| {
            store
                .try_reduce_and_merge(kind, state_key, reducer)
                .map(drop)
        })?
    }

    /// Forward to [`Store::when_merging`]
    pub fn when_merging<F>(&self, merge: F) -> Result<(), StoreError>
    where
        F: Fn(&Value, Value, Option<&str>) -> Value + 'static,
    {
        self.with_store(|store| {
            store.when_merging(merge);
        })
    }

    /// Forward to [`Store::try_when_merging`]
    pub fn try_when_merging<F>(&self, merge: Option<F>) -> Result<(), StoreError>
    where
        F: Fn(&Value, Value, Option<&str>) -> Value + 'static,
    {
        self.with_store(|store| store.try_when_merging(merge).map(drop))?
    }

    /// Forward to [`Store::before`]
    pub fn before<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: Fn(&Store<A>, &A) -> Option<A> + 'static,
    {
        self.with_store(|store| {
            store.before(f);
        })
    }

    /// Forward to [`Store::after`]
    pub fn after<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: Fn(&Value, &Value, &A) + 'static,
    {
        self.with_store(|store| {
            store.after(f);
        })
    }

    /// Forward to [`Store::dispatch`]
    pub fn dispatch(&self, action: A) -> Result<(), StoreError> {
        self.with_store(|store| store.dispatch(action))?
    }

    /// Forward to [`Store::subscribe`]
    pub fn subscribe<F>(&self, callback: F) -> Result<SubscriberId, StoreError>
    where
        F: Fn() + 'static,
    {
        self.with_store(|store| store.subscribe(callback))
    }

    /// Forward to [`Store::try_subscribe`]
    pub fn try_subscribe<F>(&self, callback: Option<F>) -> Result<SubscriberId, StoreError>
    where
        F: Fn() + 'static,
    {
        self.with_store(|store| store.try_subscribe(callback))?
    }

    /// Forward to [`Store::unsubscribe`]
    pub fn unsubscribe(&self, id: &SubscriberId) -> Result<bool, StoreError> {
        self.with_store(|store| store.unsubscribe(id))
    }

    /// Forward to [`Store::snapshot`]
    pub fn snapshot(&self) -> Result<Arc<Value>, StoreError> {
        self.with_store(|store| store.snapshot())
    }
}

/// Declare a thread-local [`StoreAccessor`]
///
/// ```ignore
/// store_accessor!(pub static APP: AppAction;);
///
/// APP.with(|app| app.dispatch(AppAction::Start))?;
/// ```
#[macro_export]
macro_rules! store_accessor {
    ($($(#[$meta:meta])* $vis:vis static $name:ident: $action:ty;)+) => {
        ::std::thread_local! {
            $(
                $(#[$meta])*
                $vis static $name: $crate::StoreAccessor<$action> =
                    const { $crate::StoreAccessor::new() };
            )+
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone, Debug)]
    enum TestAction {
        Bump,
    }

    impl Action for TestAction {
        type Kind = ();

        fn kind(&self) -> Self::Kind {}

        fn name(&self) -> &'static str {
            "Bump"
        }
    }

    fn bump(n: &Value, _: &TestAction) -> Option<Value> {
        Some(json!(n.as_i64().unwrap_or(0) + 1))
    }

    type BumpFn = fn(&Value, &TestAction) -> Option<Value>;

    fn state(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_lazy_construction() {
        let accessor = StoreAccessor::<TestAction>::new();
        assert!(!accessor.is_initialized());

        assert_eq!(*accessor.snapshot().unwrap(), json!({}));
        assert!(accessor.is_initialized());
    }

    #[test]
    fn test_forwarding_reaches_store() {
        let accessor = StoreAccessor::<TestAction>::new();
        accessor.reduce((), Some("n"), bump as BumpFn).unwrap();
        accessor.dispatch(TestAction::Bump).unwrap();
        accessor.dispatch(TestAction::Bump).unwrap();

        assert_eq!(*accessor.snapshot().unwrap(), json!({"n": 2}));
        assert_eq!(accessor.instance().unwrap().reducer_count(()), 1);
    }

    #[test]
    fn test_reset_drops_store() {
        let accessor = StoreAccessor::<TestAction>::new();
        accessor.reduce((), Some("n"), bump as BumpFn).unwrap();
        accessor.dispatch(TestAction::Bump).unwrap();

        accessor.reset().unwrap();
        assert!(!accessor.is_initialized());

        accessor.dispatch(TestAction::Bump).unwrap();
        assert_eq!(*accessor.snapshot().unwrap(), json!({}));
    }

    #[test]
    fn test_with_state_replaces_store() {
        let accessor = StoreAccessor::<TestAction>::new();
        accessor.reduce((), Some("n"), bump as BumpFn).unwrap();

        accessor.with_state(state(json!({"n": 40}))).unwrap();
        accessor.dispatch(TestAction::Bump).unwrap();

        assert_eq!(*accessor.snapshot().unwrap(), json!({"n": 40}));
        assert_eq!(accessor.instance().unwrap().reducer_count(()), 0);
    }

    #[test]
    fn test_forwarded_errors_propagate() {
        let accessor = StoreAccessor::<TestAction>::new();
        let err = accessor.try_reduce((), None, None::<BumpFn>).unwrap_err();
        assert_eq!(err, StoreError::MissingFunction { operation: "reduce" });

        assert!(accessor.try_subscribe(None::<fn()>).is_err());

        accessor.try_reduce((), Some("n"), Some(bump as BumpFn)).unwrap();
        assert_eq!(accessor.instance().unwrap().reducer_count(()), 1);
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let hits = Rc::new(Cell::new(0));
        let accessor = StoreAccessor::<TestAction>::new();
        let id = {
            let hits = Rc::clone(&hits);
            accessor
                .subscribe(move || hits.set(hits.get() + 1))
                .unwrap()
        };

        accessor.dispatch(TestAction::Bump).unwrap();
        assert!(accessor.unsubscribe(&id).unwrap());
        accessor.dispatch(TestAction::Bump).unwrap();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_reentrant_use_is_busy() {
        let accessor = StoreAccessor::<TestAction>::new();
        let guard = accessor.instance().unwrap();

        assert_eq!(
            accessor.dispatch(TestAction::Bump).unwrap_err(),
            StoreError::AccessorBusy
        );
        assert_eq!(accessor.reset().unwrap_err(), StoreError::AccessorBusy);
        assert!(accessor.is_initialized());
        drop(guard);

        assert!(accessor.reset().is_ok());
    }

    crate::store_accessor!(static THREAD_STORE: TestAction;);

    #[test]
    fn test_thread_local_accessor() {
        THREAD_STORE.with(|app| {
            app.reset().unwrap();
            app.reduce((), Some("n"), bump as BumpFn).unwrap();
            app.dispatch(TestAction::Bump).unwrap();
            assert_eq!(*app.snapshot().unwrap(), json!({"n": 1}));
        });

        let elsewhere = std::thread::spawn(|| {
            THREAD_STORE.with(|app| app.is_initialized())
        })
        .join()
        .unwrap();
        assert!(!elsewhere);
    }
}
