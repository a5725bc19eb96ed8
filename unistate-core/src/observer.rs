//! Subscriber registry notified after every dispatch

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

/// Zero-argument callback run after every completed dispatch
pub type ObserverFn = Box<dyn Fn()>;

/// Opaque handle returned by [`ObserverRegistry::subscribe`]
///
/// Backed by a random 128-bit UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Id-keyed set of observer callbacks
///
/// Notification order is unspecified.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: HashMap<SubscriberId, ObserverFn>,
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ObserverRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` under a fresh id
    ///
    /// Fails with [`StoreError::MissingFunction`] if `callback` is `None`.
    pub fn subscribe(&mut self, callback: Option<ObserverFn>) -> Result<SubscriberId, StoreError> {
        let callback = callback.ok_or(StoreError::missing("subscribe"))?;
        Ok(self.insert(callback))
    }

    /// Infallible form of [`subscribe`](Self::subscribe)
    pub fn insert(&mut self, callback: ObserverFn) -> SubscriberId {
        let mut id = SubscriberId::generate();
        while self.observers.contains_key(&id) {
            id = SubscriberId::generate();
        }
        self.observers.insert(id, callback);
        id
    }

    /// Remove the callback registered under `id`
    ///
    /// Unknown or already removed ids are ignored. Returns whether a callback
    /// was removed.
    pub fn unsubscribe(&mut self, id: &SubscriberId) -> bool {
        self.observers.remove(id).is_some()
    }

    /// Invoke every registered callback once
    pub fn notify_all(&self) {
        for callback in self.observers.values() {
            callback();
        }
    }

    /// Whether `id` is currently registered
    pub fn contains(&self, id: &SubscriberId) -> bool {
        self.observers.contains_key(id)
    }

    /// Number of registered callbacks
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Whether no callbacks are registered
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}
