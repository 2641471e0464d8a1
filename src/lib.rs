//! Conductor: a thread-backed future/promise combinator engine.
//!
//! # Overview
//!
//! Conductor lets a caller describe a tree of function invocations, some of
//! which must run concurrently and others strictly one after another, and
//! exposes the whole tree as one future that can be waited on or observed
//! through continuations.
//!
//! # Core Guarantees
//!
//! - **Exactly-once completion**: a future's outcome is written once; later
//!   completions are rejected and leave it untouched
//! - **Ordered continuations**: callbacks fire once, in registration order,
//!   after the future is finished and before waiters are released
//! - **Fan-in**: a parallel composite finishes only after every child has
//! - **Strict chains**: a sequential child is not started before its
//!   predecessor has finished
//! - **Fresh children**: combinators adopt only futures that never ran,
//!   which rules out reuse and cycles
//! - **Panic isolation**: a panicking handler completes its future with
//!   [`Outcome::Panicked`] instead of hanging its waiters
//!
//! # Module Structure
//!
//! - [`types`]: Identifiers, lifecycle states and outcomes
//! - [`future`]: The future state machine and the [`Task`] completion handle
//! - [`combinator`]: Parallel and sequential composition
//! - [`context`]: Shared named results and cancellation
//! - [`choreographer`]: Root owner of a tree and its context
//! - [`runtime`]: Engine configuration and handler threads
//! - [`sync`]: Latch and cancel token primitives
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```
//! use conductor::{parallel, sequential, Future};
//!
//! let step = |label: &'static str| Future::new(move |task| {
//!     let _ = task.done(label);
//! });
//! let root = parallel([step("a"), sequential([step("b"), step("c")])?])?;
//! assert!(root.wait().is_ok());
//! # Ok::<(), conductor::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

pub mod choreographer;
pub mod combinator;
pub mod context;
pub mod error;
pub mod future;
pub mod runtime;
pub mod sync;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-exports for convenient access to core types
pub use choreographer::Choreographer;
pub use combinator::{
    batch, batch_any, batch_arg, parallel, parallel_any, sequential, sequential_any, BatchArg,
    Strategy,
};
pub use context::Context;
pub use error::{Error, ErrorCategory, ErrorContext, ErrorKind, Result, ResultExt};
pub use future::{Future, Task};
pub use runtime::{ConfigError, Engine, EngineBuilder, EngineConfig};
pub use sync::{CancelToken, Latch};
pub use types::{FutureId, Outcome, PanicPayload, State, Value};
