//! Identifier type for futures.
//!
//! Every future receives a process-unique identifier at construction. It is
//! used for logging and error context only; identity comparisons between
//! handles go through [`Future::ptr_eq`](crate::Future::ptr_eq).

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_FUTURE_ID: AtomicU64 = AtomicU64::new(1);

/// A unique identifier for a future.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FutureId(u64);

impl FutureId {
    /// Allocates the next identifier.
    pub(crate) fn next() -> Self {
        Self(NEXT_FUTURE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Creates a future ID for testing purposes.
    #[doc(hidden)]
    #[must_use]
    pub const fn new_for_test(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for FutureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FutureId({})", self.0)
    }
}

impl fmt::Display for FutureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}
