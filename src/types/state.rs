//! The future lifecycle.
//!
//! ```text
//! NotStarted ──start()──► Pending ──done()/fail()──► Finished
//! ```
//!
//! No other transition exists and `Finished` is terminal.

use core::fmt;

pub(crate) const NOT_STARTED: u8 = 0;
pub(crate) const PENDING: u8 = 1;
pub(crate) const FINISHED: u8 = 2;

/// Lifecycle state of a future.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// The handler has not been invoked.
    NotStarted,
    /// The handler is running and has not completed the future yet.
    Pending,
    /// The handler completed the future exactly once.
    Finished,
}

impl State {
    /// Decodes the atomic representation.
    pub(crate) const fn from_u8(raw: u8) -> Self {
        match raw {
            NOT_STARTED => Self::NotStarted,
            PENDING => Self::Pending,
            _ => Self::Finished,
        }
    }

    /// Returns the state name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::Pending => "Pending",
            Self::Finished => "Finished",
        }
    }

    /// Returns true for the terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
