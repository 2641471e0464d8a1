//! The future state machine.
//!
//! A [`Future`] is a cheap, cloneable handle to one unit of deferred work:
//! a handler, its terminal [`Outcome`], and the continuations waiting for
//! it. Clones share the same underlying future.
//!
//! # Lifecycle
//!
//! ```text
//! NotStarted ──start()──► Pending ──Task::done()/fail()──► Finished
//! ```
//!
//! - `start` launches the handler on its own engine thread and never blocks.
//! - `wait` starts the future if needed, then blocks until it is finished.
//! - The completion operation records the outcome, flips the state to
//!   `Finished`, runs continuations in registration order and only then
//!   releases waiters.
//! - Continuations registered after completion run synchronously at
//!   registration time.
//!
//! # Handler Contract
//!
//! A handler receives a [`Task`] and must complete it exactly once, either
//! before returning or later from any thread it hands the task to. A
//! handler that panics before completing is completed with
//! [`Outcome::Panicked`]. A handler that never completes leaves waiters
//! blocked; [`Future::wait_timeout`] bounds the wait.

mod task;

pub use task::Task;

use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

use crate::combinator::{self, Strategy};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::runtime::Engine;
use crate::types::state::{FINISHED, NOT_STARTED, PENDING};
use crate::types::{FutureId, Outcome, PanicPayload, State};

pub(crate) type Handler = Box<dyn FnOnce(Task) + Send + 'static>;
type Continuation = Box<dyn FnOnce(&Outcome) + Send + 'static>;

/// A handle to a deferred, exactly-once-completed unit of work.
#[derive(Clone)]
pub struct Future {
    inner: Arc<Inner>,
}

struct Inner {
    id: FutureId,
    name: Option<String>,
    engine: Engine,
    state: AtomicU8,
    handler: Mutex<Option<Handler>>,
    batch: Option<Batch>,
    slot: Mutex<Slot>,
    settled: Condvar,
}

struct Batch {
    strategy: Strategy,
    children: Vec<Future>,
}

#[derive(Default)]
struct Slot {
    outcome: Option<Outcome>,
    continuations: Vec<Continuation>,
    /// Set once every continuation has run; waiters block on this.
    settled: bool,
}

impl Future {
    /// Creates a leaf future on the global engine.
    ///
    /// ```
    /// use conductor::Future;
    ///
    /// let future = Future::new(|task| {
    ///     let _ = task.done("A".to_string());
    /// });
    /// assert!(future.is_not_started());
    /// let outcome = future.wait();
    /// assert_eq!(outcome.value_as::<String>().map(String::as_str), Some("A"));
    /// ```
    pub fn new<F>(handler: F) -> Self
    where
        F: FnOnce(Task) + Send + 'static,
    {
        Engine::global().future(handler)
    }

    /// Creates a leaf future whose handler receives a typed argument pack.
    ///
    /// The arguments are captured now and handed to the handler at start;
    /// the engine never inspects them.
    pub fn with_args<A, F>(handler: F, args: A) -> Self
    where
        A: Send + 'static,
        F: FnOnce(Task, A) + Send + 'static,
    {
        Engine::global().future_with_args(handler, args)
    }

    /// Creates a named leaf future on the global engine.
    ///
    /// When it completes with a value, the value is published into the
    /// [`Context`] it runs in under `name`.
    pub fn named<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: FnOnce(Task) + Send + 'static,
    {
        Engine::global().named(name, handler)
    }

    pub(crate) fn leaf(engine: Engine, name: Option<String>, handler: Handler) -> Self {
        Self::build(engine, name, handler, None)
    }

    pub(crate) fn composite(engine: Engine, strategy: Strategy, children: Vec<Self>) -> Self {
        let handler: Handler = match strategy {
            Strategy::Parallel => Box::new(combinator::fan_out::run),
            Strategy::Sequential => Box::new(combinator::chain::run),
        };
        Self::build(engine, None, handler, Some(Batch { strategy, children }))
    }

    fn build(engine: Engine, name: Option<String>, handler: Handler, batch: Option<Batch>) -> Self {
        let future = Self {
            inner: Arc::new(Inner {
                id: FutureId::next(),
                name,
                engine,
                state: AtomicU8::new(NOT_STARTED),
                handler: Mutex::new(Some(handler)),
                batch,
                slot: Mutex::new(Slot::default()),
                settled: Condvar::new(),
            }),
        };
        trace!(
            future_id = %future.id(),
            name = ?future.name(),
            strategy = ?future.strategy(),
            "future created"
        );
        future
    }

    /// Returns the future's identifier.
    #[must_use]
    pub fn id(&self) -> FutureId {
        self.inner.id
    }

    /// Returns the future's name, if it was built with one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// Returns the engine that launches this future's handler.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.inner.engine
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> State {
        State::from_u8(self.inner.state.load(Ordering::Acquire))
    }

    /// Returns true before the handler has been launched.
    #[must_use]
    pub fn is_not_started(&self) -> bool {
        self.state() == State::NotStarted
    }

    /// Returns true while the handler runs and has not completed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state() == State::Pending
    }

    /// Returns true once the future has completed. Stays true forever.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state() == State::Finished
    }

    /// Returns true for composite futures.
    #[must_use]
    pub fn is_batch(&self) -> bool {
        self.inner.batch.is_some()
    }

    /// Returns the composition strategy of a composite future.
    #[must_use]
    pub fn strategy(&self) -> Option<Strategy> {
        self.inner.batch.as_ref().map(|batch| batch.strategy)
    }

    /// Returns the children of a composite future, in argument order.
    ///
    /// Fails with `ErrorKind::NotABatch` on a leaf future.
    pub fn children(&self) -> Result<&[Self]> {
        self.inner
            .batch
            .as_ref()
            .map(|batch| batch.children.as_slice())
            .ok_or_else(|| Error::not_a_batch(self.id()))
    }

    /// Returns the outcome without blocking, if the future has finished.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.inner.slot.lock().outcome.clone()
    }

    /// Returns true if both handles refer to the same future.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Launches the handler on a new engine thread with a fresh [`Context`].
    ///
    /// Fails with `ErrorKind::AlreadyStarted` unless the future is
    /// `NotStarted`. Never blocks, unless the engine opted into
    /// `inline_fallback` and the thread spawn failed; the handler then runs
    /// on the caller's thread before `start` returns.
    pub fn start(&self) -> Result<()> {
        self.start_with(Context::new())
    }

    /// Launches the handler with the given shared context.
    pub fn start_with(&self, context: Context) -> Result<()> {
        if let Err(actual) = self.inner.state.compare_exchange(
            NOT_STARTED,
            PENDING,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            let state = State::from_u8(actual);
            debug!(future_id = %self.id(), state = %state, "start rejected");
            return Err(Error::already_started(self.id(), state));
        }

        let Some(handler) = self.inner.handler.lock().take() else {
            return Err(Error::internal(format!(
                "future {} has no handler to launch",
                self.id()
            )));
        };
        debug!(future_id = %self.id(), name = ?self.name(), "future started");

        let task = Task::new(self.clone(), context);
        let launched = self.inner.engine.launch({
            let task = task.clone();
            move || run_handler(handler, task)
        });
        if let Err(err) = launched {
            warn!(future_id = %self.id(), error = %err, "handler could not be launched");
            let _ = task.fail_with(
                Error::internal("failed to spawn handler thread").with_source(err),
            );
        }
        Ok(())
    }

    /// Blocks until the future finishes and returns its outcome.
    ///
    /// Starts the future first if nobody has. Any number of threads may
    /// wait concurrently; all observe the same outcome. A finished future
    /// returns its outcome at once, even from inside one of its own
    /// continuations. Waiters parked before completion are released only
    /// after every continuation has run.
    pub fn wait(&self) -> Outcome {
        self.wait_with(Context::new())
    }

    /// Like [`wait`](Self::wait), starting the future in `context` if needed.
    pub fn wait_with(&self, context: Context) -> Outcome {
        self.ensure_started(context);
        let mut slot = self.inner.slot.lock();
        if let Some(outcome) = &slot.outcome {
            return outcome.clone();
        }
        while !slot.settled {
            self.inner.settled.wait(&mut slot);
        }
        settled_outcome(&slot, self.id())
    }

    /// Like [`wait`](Self::wait) but gives up after `timeout`.
    ///
    /// Returns `None` if the future did not finish in time.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Outcome> {
        self.ensure_started(Context::new());
        let mut slot = self.inner.slot.lock();
        if let Some(outcome) = &slot.outcome {
            return Some(outcome.clone());
        }
        // A deadline past the end of `Instant` means no deadline.
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            while !slot.settled {
                self.inner.settled.wait(&mut slot);
            }
            return Some(settled_outcome(&slot, self.id()));
        };
        while !slot.settled {
            if self
                .inner
                .settled
                .wait_until(&mut slot, deadline)
                .timed_out()
            {
                return slot.outcome.clone();
            }
        }
        Some(settled_outcome(&slot, self.id()))
    }

    /// Registers a continuation receiving the outcome.
    ///
    /// Continuations run once, in registration order, on the thread that
    /// completes the future. If the future has already finished, `callback`
    /// runs synchronously before this call returns.
    pub fn then<F>(&self, callback: F)
    where
        F: FnOnce(&Outcome) + Send + 'static,
    {
        let outcome = {
            let mut slot = self.inner.slot.lock();
            let existing = slot.outcome.clone();
            match existing {
                Some(outcome) => outcome,
                None => {
                    slot.continuations.push(Box::new(callback));
                    return;
                }
            }
        };
        callback(&outcome);
    }

    fn ensure_started(&self, context: Context) {
        if self.is_not_started() {
            // Losing the race to another starter is fine; we just wait.
            if let Err(err) = self.start_with(context) {
                trace!(future_id = %self.id(), error = %err, "implicit start skipped");
            }
        }
    }

    /// Records the outcome, publishes named values, fires continuations and
    /// releases waiters. Only the first call succeeds.
    pub(crate) fn complete(&self, outcome: Outcome, context: Option<&Context>) -> Result<()> {
        let continuations = {
            let mut slot = self.inner.slot.lock();
            if slot.outcome.is_some() {
                drop(slot);
                warn!(future_id = %self.id(), "completion called twice");
                return Err(Error::already_completed(self.id()));
            }
            // Published before the outcome so early waiters can read it back.
            if let (Some(context), Some(name), Some(value)) =
                (context, self.name(), outcome.value())
            {
                context.set_value(name, Arc::clone(value));
            }
            slot.outcome = Some(outcome.clone());
            self.inner.state.store(FINISHED, Ordering::Release);
            std::mem::take(&mut slot.continuations)
        };

        debug!(
            future_id = %self.id(),
            name = ?self.name(),
            outcome = ?outcome,
            continuations = continuations.len(),
            "future finished"
        );

        for continuation in continuations {
            let fired = panic::catch_unwind(AssertUnwindSafe(|| continuation(&outcome)));
            if let Err(payload) = fired {
                let payload = PanicPayload::from_unwind(payload.as_ref());
                warn!(future_id = %self.id(), panic = %payload, "continuation panicked");
            }
        }

        let mut slot = self.inner.slot.lock();
        slot.settled = true;
        self.inner.settled.notify_all();
        Ok(())
    }
}

fn settled_outcome(slot: &Slot, id: FutureId) -> Outcome {
    slot.outcome.clone().unwrap_or_else(|| {
        Outcome::Err(Error::internal(format!(
            "future {id} settled without an outcome"
        )))
    })
}

fn run_handler(handler: Handler, task: Task) {
    let future = task.future().clone();
    let result = panic::catch_unwind(AssertUnwindSafe(move || handler(task)));
    if let Err(payload) = result {
        let payload = PanicPayload::from_unwind(payload.as_ref());
        warn!(future_id = %future.id(), panic = %payload, "handler panicked");
        if !future.is_finished() {
            let _ = future.complete(Outcome::Panicked(payload), None);
        }
    }
}

impl fmt::Debug for Future {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Future");
        debug
            .field("id", &self.id())
            .field("name", &self.name())
            .field("state", &self.state());
        if let Some(batch) = &self.inner.batch {
            debug
                .field("strategy", &batch.strategy)
                .field("children", &batch.children.len());
        }
        debug.finish()
    }
}
