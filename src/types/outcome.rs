//! Terminal outcome of a future.
//!
//! A finished future holds exactly one of:
//!
//! - `Ok(Option<Value>)`: the handler called `done`, with or without a value
//! - `Err(Error)`: the handler called `fail`
//! - `Panicked(PanicPayload)`: the handler panicked before completing
//!
//! Composite futures always finish with `Ok(None)`; child results are not
//! aggregated and stay attached to the child that produced them.

use core::fmt;
use std::any::Any;
use std::sync::Arc;

use crate::error::Error;

/// Opaque value produced by a handler.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Payload from a caught panic.
///
/// This wraps the panic value for safe transport across thread boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicPayload {
    message: String,
}

impl PanicPayload {
    /// Creates a new panic payload with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Extracts a message from a payload returned by `catch_unwind`.
    #[must_use]
    pub fn from_unwind(payload: &(dyn Any + Send)) -> Self {
        if let Some(s) = payload.downcast_ref::<&str>() {
            Self::new(*s)
        } else if let Some(s) = payload.downcast_ref::<String>() {
            Self::new(s.clone())
        } else {
            Self::new("unknown panic")
        }
    }

    /// Returns the panic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PanicPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panic: {}", self.message)
    }
}

/// The terminal result of a future.
#[derive(Clone)]
pub enum Outcome {
    /// The handler completed successfully, optionally with a value.
    Ok(Option<Value>),
    /// The handler reported a failure.
    Err(Error),
    /// The handler panicked before completing its future.
    Panicked(PanicPayload),
}

impl Outcome {
    /// Successful outcome carrying `value`.
    #[must_use]
    pub fn ok<T: Any + Send + Sync>(value: T) -> Self {
        Self::Ok(Some(Arc::new(value)))
    }

    /// Successful outcome without a value.
    #[must_use]
    pub const fn empty() -> Self {
        Self::Ok(None)
    }

    /// Returns true if this is a success.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Returns true if the handler failed.
    #[must_use]
    pub const fn is_err(&self) -> bool {
        matches!(self, Self::Err(_))
    }

    /// Returns true if the handler panicked.
    #[must_use]
    pub const fn is_panicked(&self) -> bool {
        matches!(self, Self::Panicked(_))
    }

    /// Returns the success value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Ok(value) => value.as_ref(),
            _ => None,
        }
    }

    /// Returns the success value downcast to `T`.
    ///
    /// `None` when there is no value or it holds a different type.
    #[must_use]
    pub fn value_as<T: Any>(&self) -> Option<&T> {
        self.value().and_then(|value| value.downcast_ref::<T>())
    }

    /// Returns the failure, if any. Panics surface as `ErrorKind::Panicked`.
    #[must_use]
    pub fn error(&self) -> Option<Error> {
        match self {
            Self::Ok(_) => None,
            Self::Err(err) => Some(err.clone()),
            Self::Panicked(payload) => Some(Error::panicked(payload)),
        }
    }

    /// Splits into the `(value, error)` pair; at most one side is set.
    #[must_use]
    pub fn into_parts(self) -> (Option<Value>, Option<Error>) {
        match self {
            Self::Ok(value) => (value, None),
            Self::Err(err) => (None, Some(err)),
            Self::Panicked(payload) => (None, Some(Error::panicked(&payload))),
        }
    }

    /// Converts into a standard result.
    pub fn into_result(self) -> crate::error::Result<Option<Value>> {
        match self.into_parts() {
            (_, Some(err)) => Err(err),
            (value, None) => Ok(value),
        }
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok(None) => f.write_str("Ok(None)"),
            Self::Ok(Some(_)) => f.write_str("Ok(<value>)"),
            Self::Err(err) => f.debug_tuple("Err").field(err).finish(),
            Self::Panicked(payload) => f.debug_tuple("Panicked").field(payload).finish(),
        }
    }
}
