//! Shared cancellation flag.
//!
//! Cancellation is cooperative: tripping the token never interrupts a
//! running handler. Leaf handlers poll [`CancelToken::is_cancelled`] at
//! points of their choosing and fail their own future if they decide to
//! stop. Combinators do not consult the token.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    reason: Mutex<Option<String>>,
}

/// Cloneable cancellation token; clones share one flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    state: Arc<CancelState>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trips the token.
    ///
    /// Returns `true` for the call that performed the transition; later
    /// calls keep the first reason and return `false`.
    pub fn cancel(&self, reason: impl Into<String>) -> bool {
        // The reason is stored before the flag flips, so any observer of
        // `is_cancelled` also sees it.
        let mut slot = self.state.reason.lock();
        if self.state.cancelled.load(Ordering::SeqCst) {
            return false;
        }
        let reason = reason.into();
        debug!(reason = %reason, "cancel token tripped");
        *slot = Some(reason);
        self.state.cancelled.store(true, Ordering::SeqCst);
        true
    }

    /// Returns true once the token has been tripped.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Returns the reason given by the first `cancel` call.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.state.reason.lock().clone()
    }
}
