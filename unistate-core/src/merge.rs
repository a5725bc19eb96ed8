//! Merge strategy for auto-merge reducer results

use std::fmt;

use serde_json::Value;

use crate::error::{type_name, StoreError};

/// Custom merge function: `(old_state, reducer_result, state_key) -> new_state`
pub type MergeFn = Box<dyn Fn(&Value, Value, Option<&str>) -> Value>;

/// Decides how an auto-merge reducer's result is folded into the state
///
/// Holds at most one custom merge function. Installing a new one replaces the
/// previous one, and it applies to every auto-merge binding in the store.
#[derive(Default)]
pub struct MergeStrategy {
    custom: Option<MergeFn>,
}

impl fmt::Debug for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeStrategy")
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

impl MergeStrategy {
    /// Strategy using only the default merge rule
    pub fn new() -> Self {
        Self::default()
    }

    /// Install (or overwrite) the custom merge function
    ///
    /// Fails with [`StoreError::MissingFunction`] if `merge` is `None`.
    pub fn install(&mut self, merge: Option<MergeFn>) -> Result<(), StoreError> {
        self.set(merge.ok_or(StoreError::missing("install"))?);
        Ok(())
    }

    /// Install (or overwrite) the custom merge function
    pub fn set(&mut self, merge: MergeFn) {
        self.custom = Some(merge);
    }

    /// Whether a custom merge function is installed
    pub fn is_custom(&self) -> bool {
        self.custom.is_some()
    }

    /// Combine `new` into `old`
    ///
    /// With a custom function installed, the result is whatever it returns,
    /// and it must be an object. Otherwise the default rule applies:
    /// - with a `state_key`, `old` with that key set to `new`
    /// - without one, `old` overlaid with the entries of `new`
    pub fn resolve(
        &self,
        old: &Value,
        new: Value,
        state_key: Option<&str>,
    ) -> Result<Value, StoreError> {
        match &self.custom {
            Some(merge) => {
                let merged = merge(old, new, state_key);
                if merged.is_object() {
                    Ok(merged)
                } else {
                    Err(StoreError::StateNotObject {
                        found: type_name(&merged),
                    })
                }
            }
            None => default_merge(old, new, state_key),
        }
    }
}

/// Shallow merge of `new` into a copy of `old`
pub fn default_merge(
    old: &Value,
    new: Value,
    state_key: Option<&str>,
) -> Result<Value, StoreError> {
    let mut merged = match old {
        Value::Object(map) => map.clone(),
        other => {
            return Err(StoreError::StateNotObject {
                found: type_name(other),
            })
        }
    };

    match (state_key, new) {
        (Some(key), value) => {
            merged.insert(key.to_owned(), value);
        }
        (None, Value::Object(entries)) => merged.extend(entries),
        (None, other) => {
            return Err(StoreError::MergeNotObject {
                found: type_name(&other),
            })
        }
    }

    Ok(Value::Object(merged))
}
