//! Root owner of a future tree.
//!
//! A [`Choreographer`] pairs one root future with the [`Context`] the whole
//! tree runs in. Named leaves publish their values into that context as
//! they finish, so a leaf scheduled later in a sequential chain can read
//! what an earlier sibling produced.
//!
//! ```
//! use conductor::{sequential, Choreographer, Future};
//!
//! let extract = Future::named("rows", |task| {
//!     let _ = task.done(vec![3_u32, 4, 5]);
//! });
//! let load = Future::named("total", |task| {
//!     let rows = task.context().get::<Vec<u32>>("rows");
//!     let total: u32 = rows.ok().flatten().map_or(0, |rows| rows.iter().sum());
//!     let _ = task.done(total);
//! });
//! let choreographer = Choreographer::new(sequential([extract, load])?)?;
//! assert!(choreographer.run().is_ok());
//! assert_eq!(choreographer.result::<u32>("total")?.as_deref(), Some(&12));
//! # Ok::<(), conductor::Error>(())
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::context::Context;
use crate::error::{Error, Result};
use crate::future::Future;
use crate::types::{Outcome, State};

/// Owns a root future and the shared context its tree runs in.
#[derive(Debug, Clone)]
pub struct Choreographer {
    root: Future,
    context: Context,
}

impl Choreographer {
    /// Takes ownership of `root` with a fresh context.
    ///
    /// Fails with `ErrorKind::AlreadyStarted` if `root` has been started.
    pub fn new(root: Future) -> Result<Self> {
        Self::with_context(root, Context::new())
    }

    /// Takes ownership of `root`, running it in an existing context.
    pub fn with_context(root: Future, context: Context) -> Result<Self> {
        let state = root.state();
        if state != State::NotStarted {
            return Err(Error::already_started(root.id(), state));
        }
        debug!(root = %root.id(), "choreographer created");
        Ok(Self { root, context })
    }

    /// Returns the root future.
    #[must_use]
    pub fn root(&self) -> &Future {
        &self.root
    }

    /// Returns the shared context holding named results.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Starts the root in the shared context without blocking.
    pub fn start(&self) -> Result<()> {
        info!(root = %self.root.id(), "choreography starting");
        self.root.start_with(self.context.clone())
    }

    /// Blocks until the root finishes, starting it first if needed.
    pub fn wait(&self) -> Outcome {
        let outcome = self.root.wait_with(self.context.clone());
        info!(
            root = %self.root.id(),
            results = self.context.len(),
            outcome = ?outcome,
            "choreography finished"
        );
        outcome
    }

    /// Like [`wait`](Self::wait) but gives up after `timeout`.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Outcome> {
        if self.root.is_not_started() {
            let _ = self.start();
        }
        self.root.wait_timeout(timeout)
    }

    /// Starts the root and waits for it.
    pub fn run(&self) -> Outcome {
        self.wait()
    }

    /// Reads the named result published by a leaf of this tree.
    pub fn result<T: std::any::Any + Send + Sync>(&self, name: &str) -> Result<Option<Arc<T>>> {
        self.context.get(name)
    }

    /// Requests cooperative cancellation of the tree.
    ///
    /// Running handlers are not interrupted; leaves that poll
    /// [`Task::is_cancelled`](crate::Task::is_cancelled) may stop early.
    /// Returns true for the first request.
    pub fn cancel(&self, reason: impl Into<String>) -> bool {
        self.context.cancel(reason)
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.context.is_cancelled()
    }
}
