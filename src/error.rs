//! Error types and error handling strategy for conductor.
//!
//! Error handling follows these principles:
//!
//! - Errors are explicit and typed (no stringly-typed errors)
//! - Tree-assembly mistakes are returned from constructors, never panics
//! - Handler failures are data: they are stored in the future's
//!   [`Outcome`](crate::types::Outcome) and never re-thrown by combinators
//!
//! # Error Categories
//!
//! - **Construction**: the tree was assembled wrongly (empty batch, a child
//!   that is not a future, a child that already ran)
//! - **Protocol**: a future primitive was misused (double start, double
//!   completion, `children()` on a leaf)
//! - **Context**: a shared result was read back with the wrong type
//! - **Config**: engine configuration could not be parsed
//! - **Cancellation**: a handler observed a cancelled choreography
//! - **Handler**: user handler failures and panics
//! - **Internal**: engine bugs

use core::fmt;
use std::sync::Arc;

use crate::types::{FutureId, PanicPayload, State};

/// The kind of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // === Construction ===
    /// A combinator was given zero children.
    EmptyBatch,
    /// A dynamically supplied batch argument is not a future.
    NotAFuture,
    /// A child future was already started or finished.
    ChildNotFresh,
    /// The same future appears twice in one batch.
    DuplicateChild,

    // === Protocol ===
    /// `start` was called on a future that is not `NotStarted`.
    AlreadyStarted,
    /// The completion operation was called more than once.
    AlreadyCompleted,
    /// `children` was called on a leaf future.
    NotABatch,

    // === Context ===
    /// A shared result exists but holds a different type.
    TypeMismatch,

    // === Config ===
    /// Engine configuration value is invalid.
    InvalidConfig,

    // === Cancellation ===
    /// The choreography was cancelled.
    Cancelled,

    // === Handler ===
    /// User handler reported a failure.
    User,
    /// User handler panicked before completing its future.
    Panicked,

    // === Internal ===
    /// Internal engine error (bug).
    Internal,
}

impl ErrorKind {
    /// Returns the error category for this kind.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyBatch | Self::NotAFuture | Self::ChildNotFresh | Self::DuplicateChild => {
                ErrorCategory::Construction
            }
            Self::AlreadyStarted | Self::AlreadyCompleted | Self::NotABatch => {
                ErrorCategory::Protocol
            }
            Self::TypeMismatch => ErrorCategory::Context,
            Self::InvalidConfig => ErrorCategory::Config,
            Self::Cancelled => ErrorCategory::Cancellation,
            Self::User | Self::Panicked => ErrorCategory::Handler,
            Self::Internal => ErrorCategory::Internal,
        }
    }

    /// Returns true if this kind signals a programming mistake in how the
    /// tree was assembled or how a primitive was driven.
    #[must_use]
    pub const fn is_misuse(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Construction | ErrorCategory::Protocol
        )
    }
}

/// High-level error category for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Tree assembly failures.
    Construction,
    /// Misuse of the future primitive.
    Protocol,
    /// Shared result store access failures.
    Context,
    /// Configuration failures.
    Config,
    /// Cancellation observed by a handler.
    Cancellation,
    /// Failures reported by (or panics in) user handlers.
    Handler,
    /// Internal engine errors.
    Internal,
}

/// Diagnostic context for an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// The future the error concerns.
    pub future_id: Option<FutureId>,
    /// Argument position inside a batch, for construction errors.
    pub position: Option<usize>,
    /// State observed on the offending future.
    pub state: Option<State>,
}

/// The main error type for conductor operations.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
    context: ErrorContext,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
            context: ErrorContext {
                future_id: None,
                position: None,
                state: None,
            },
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Returns true if this error represents cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self.kind, ErrorKind::Cancelled)
    }

    /// Returns true if this error was produced by a user handler.
    #[must_use]
    pub const fn is_handler_error(&self) -> bool {
        matches!(self.kind.category(), ErrorCategory::Handler)
    }

    /// Adds a message description to the error.
    #[must_use]
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Adds structured context to the error.
    #[must_use]
    pub fn with_context(mut self, ctx: ErrorContext) -> Self {
        self.context = ctx;
        self
    }

    /// Adds a source error to the chain.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Records the batch argument position this error concerns.
    #[must_use]
    pub fn with_position(mut self, position: usize) -> Self {
        self.context.position = Some(position);
        self
    }

    /// Returns the error message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the error context.
    #[must_use]
    pub fn context(&self) -> &ErrorContext {
        &self.context
    }

    /// Returns the batch argument position, if this is a positional error.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        self.context.position
    }

    /// Creates an empty batch error.
    #[must_use]
    pub fn empty_batch() -> Self {
        Self::new(ErrorKind::EmptyBatch).with_message("a batch needs at least one child future")
    }

    /// Creates a not-a-future error for a batch argument.
    #[must_use]
    pub fn not_a_future(position: usize) -> Self {
        Self::new(ErrorKind::NotAFuture)
            .with_message(format!("argument at position {position} is not a future"))
            .with_position(position)
    }

    /// Creates a reuse violation error for a child that already ran.
    #[must_use]
    pub fn child_not_fresh(position: usize, id: FutureId, state: State) -> Self {
        Self::new(ErrorKind::ChildNotFresh)
            .with_message(format!(
                "child {id} at position {position} is {state}, expected NotStarted"
            ))
            .with_context(ErrorContext {
                future_id: Some(id),
                position: Some(position),
                state: Some(state),
            })
    }

    /// Creates a duplicate child error.
    #[must_use]
    pub fn duplicate_child(position: usize, first: usize, id: FutureId) -> Self {
        Self::new(ErrorKind::DuplicateChild)
            .with_message(format!(
                "child {id} at position {position} already appears at position {first}"
            ))
            .with_context(ErrorContext {
                future_id: Some(id),
                position: Some(position),
                state: None,
            })
    }

    /// Creates a double start error.
    #[must_use]
    pub fn already_started(id: FutureId, state: State) -> Self {
        Self::new(ErrorKind::AlreadyStarted)
            .with_message(format!("future {id} cannot start: state is {state}"))
            .with_context(ErrorContext {
                future_id: Some(id),
                position: None,
                state: Some(state),
            })
    }

    /// Creates a double completion error.
    #[must_use]
    pub fn already_completed(id: FutureId) -> Self {
        Self::new(ErrorKind::AlreadyCompleted)
            .with_message(format!("future {id} was already completed"))
            .with_context(ErrorContext {
                future_id: Some(id),
                position: None,
                state: Some(State::Finished),
            })
    }

    /// Creates a not-a-batch error.
    #[must_use]
    pub fn not_a_batch(id: FutureId) -> Self {
        Self::new(ErrorKind::NotABatch)
            .with_message(format!("future {id} is not a batch"))
            .with_context(ErrorContext {
                future_id: Some(id),
                position: None,
                state: None,
            })
    }

    /// Creates a type mismatch error for a named shared result.
    #[must_use]
    pub fn type_mismatch(name: &str, expected: &str) -> Self {
        Self::new(ErrorKind::TypeMismatch)
            .with_message(format!("result '{name}' is not a {expected}"))
    }

    /// Creates a cancellation error.
    #[must_use]
    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled).with_message(reason)
    }

    /// Wraps a user handler failure.
    #[must_use]
    pub fn user(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        let message = source.to_string();
        Self::new(ErrorKind::User)
            .with_message(message)
            .with_source(source)
    }

    /// Creates an error describing a handler panic.
    #[must_use]
    pub fn panicked(payload: &PanicPayload) -> Self {
        Self::new(ErrorKind::Panicked).with_message(payload.message())
    }

    /// Creates an internal error (engine bug).
    #[must_use]
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal).with_message(detail)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(msg) = &self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

/// Extension trait for adding context to Results.
#[allow(clippy::result_large_err)]
pub trait ResultExt<T> {
    /// Attach a context message on error.
    fn context(self, msg: impl Into<String>) -> Result<T>;
    /// Attach context message computed lazily on error.
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for core::result::Result<T, E> {
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_message(msg))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| e.into().with_message(f()))
    }
}

/// A specialized Result type for conductor operations.
#[allow(clippy::result_large_err)]
pub type Result<T> = core::result::Result<T, Error>;
