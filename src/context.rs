//! Shared execution context.
//!
//! A [`Context`] travels down a future tree: coordinators hand their own
//! context to every child they start. It carries two things:
//!
//! - a named result store, filled by [`Future::named`](crate::Future::named)
//!   leaves as they complete and readable by anything later in the tree
//! - a [`CancelToken`] that cooperative handlers may poll
//!
//! The context is an explicit capability. There is no process-global store;
//! two choreographies running side by side never see each other's results.

use parking_lot::Mutex;
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::error::{Error, Result};
use crate::sync::CancelToken;
use crate::types::Value;

/// Cloneable handle to a shared result store and cancellation token.
#[derive(Clone, Default)]
pub struct Context {
    inner: Arc<ContextInner>,
}

#[derive(Default)]
struct ContextInner {
    results: Mutex<HashMap<String, Value>>,
    cancel: CancelToken,
}

impl Context {
    /// Creates an empty context with a fresh cancel token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `name`, replacing any previous entry.
    pub fn set<T: Any + Send + Sync>(&self, name: impl Into<String>, value: T) {
        self.set_value(name, Arc::new(value));
    }

    /// Stores an already shared value under `name`.
    pub fn set_value(&self, name: impl Into<String>, value: Value) {
        let name = name.into();
        trace!(name = %name, "context result stored");
        self.inner.results.lock().insert(name, value);
    }

    /// Reads the value stored under `name` as a `T`.
    ///
    /// Returns `Ok(None)` when nothing is stored and fails with
    /// `ErrorKind::TypeMismatch` when the stored value has another type.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Result<Option<Arc<T>>> {
        let Some(value) = self.get_value(name) else {
            return Ok(None);
        };
        value
            .downcast::<T>()
            .map(Some)
            .map_err(|_| Error::type_mismatch(name, type_name::<T>()))
    }

    /// Reads the untyped value stored under `name`.
    #[must_use]
    pub fn get_value(&self, name: &str) -> Option<Value> {
        self.inner.results.lock().get(name).cloned()
    }

    /// Returns true if a value is stored under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.results.lock().contains_key(name)
    }

    /// Returns the stored names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.results.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of stored results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.results.lock().len()
    }

    /// Returns true if no result has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.results.lock().is_empty()
    }

    /// Copies the current results out of the store.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.inner.results.lock().clone()
    }

    /// Returns the cancellation token shared by this context.
    #[must_use]
    pub fn cancel_token(&self) -> &CancelToken {
        &self.inner.cancel
    }

    /// Requests cancellation. Returns true for the first request.
    pub fn cancel(&self, reason: impl Into<String>) -> bool {
        self.inner.cancel.cancel(reason)
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Returns true if both handles refer to the same context.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("results", &self.names())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn typed_round_trip() {
        let context = Context::new();
        assert!(context.is_empty());
        context.set("extract", vec![1_u8, 2, 3]);
        let value = context.get::<Vec<u8>>("extract").expect("right type");
        assert_eq!(value.as_deref(), Some(&vec![1, 2, 3]));
        assert!(context.get::<Vec<u8>>("missing").expect("absent is fine").is_none());
    }

    #[test]
    fn wrong_type_is_reported() {
        let context = Context::new();
        context.set("count", 3_u32);
        let err = context.get::<String>("count").expect_err("mismatch");
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert!(err.to_string().contains("count"));
    }

    #[test]
    fn names_are_sorted_and_shared_between_clones() {
        let context = Context::new();
        let clone = context.clone();
        clone.set("b", 2_i32);
        context.set("a", 1_i32);
        assert_eq!(context.names(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(clone.len(), 2);
        assert!(clone.contains("a"));
        assert!(context.ptr_eq(&clone));
        assert_eq!(context.snapshot().len(), 2);
    }

    #[test]
    fn cancellation_is_shared() {
        let context = Context::new();
        let clone = context.clone();
        assert!(!clone.is_cancelled());
        assert!(context.cancel("stop"));
        assert!(!context.cancel("again"));
        assert!(clone.is_cancelled());
        assert_eq!(clone.cancel_token().reason().as_deref(), Some("stop"));
        assert!(format!("{context:?}").contains("cancelled: true"));
    }
}
