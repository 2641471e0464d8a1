//! The completion handle given to handlers.

use std::any::Any;
use std::sync::Arc;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::future::Future;
use crate::types::{FutureId, Outcome, Value};

/// Completion capability for a running future.
///
/// A handler receives its `Task` by value and may clone it or move it to
/// another thread. Whichever copy completes first wins; later calls return
/// `ErrorKind::AlreadyCompleted` and leave the outcome untouched.
#[derive(Clone, Debug)]
pub struct Task {
    future: Future,
    context: Context,
}

impl Task {
    pub(crate) fn new(future: Future, context: Context) -> Self {
        Self { future, context }
    }

    /// Returns the id of the future this task completes.
    #[must_use]
    pub fn id(&self) -> FutureId {
        self.future.id()
    }

    /// Returns the name of the future, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.future.name()
    }

    /// Returns the future this task completes.
    #[must_use]
    pub fn future(&self) -> &Future {
        &self.future
    }

    /// Returns the shared context this future runs in.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Returns true once cancellation was requested for the context.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.context.is_cancelled()
    }

    /// Completes the future successfully with `value`.
    pub fn done<T: Any + Send + Sync>(&self, value: T) -> Result<()> {
        self.finish(Outcome::ok(value))
    }

    /// Completes the future successfully with an already shared value.
    pub fn done_value(&self, value: Value) -> Result<()> {
        self.finish(Outcome::Ok(Some(value)))
    }

    /// Completes the future successfully without a value.
    pub fn done_empty(&self) -> Result<()> {
        self.finish(Outcome::empty())
    }

    /// Completes the future with a handler error.
    pub fn fail<E>(&self, err: E) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.finish(Outcome::Err(Error::user(err)))
    }

    /// Completes the future with a prepared error.
    pub fn fail_with(&self, err: Error) -> Result<()> {
        self.finish(Outcome::Err(err))
    }

    /// Fails the future with `ErrorKind::Cancelled` if cancellation was
    /// requested. Returns true when it did.
    pub fn fail_if_cancelled(&self) -> bool {
        let token = self.context.cancel_token();
        if !token.is_cancelled() {
            return false;
        }
        let reason = token.reason().unwrap_or_else(|| "cancelled".to_string());
        self.fail_with(Error::cancelled(reason)).is_ok()
    }

    fn finish(&self, outcome: Outcome) -> Result<()> {
        self.future.complete(outcome, Some(&self.context))
    }
}
