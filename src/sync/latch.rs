//! Countdown latch for fan-in.
//!
//! The latch opens once `count_down` has been called `count` times. Waiters
//! block on a condition variable until then. Extra count-downs past zero
//! are ignored, so a latch never reopens or underflows.

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// One-shot countdown latch.
#[derive(Debug)]
pub struct Latch {
    remaining: Mutex<usize>,
    cvar: Condvar,
}

impl Latch {
    /// Creates a latch that opens after `count` signals.
    ///
    /// A latch created with zero is already open.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            remaining: Mutex::new(count),
            cvar: Condvar::new(),
        }
    }

    /// Records one signal and returns the number still outstanding.
    pub fn count_down(&self) -> usize {
        let mut remaining = self.remaining.lock();
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            self.cvar.notify_all();
        }
        *remaining
    }

    /// Returns the number of outstanding signals.
    #[must_use]
    pub fn remaining(&self) -> usize {
        *self.remaining.lock()
    }

    /// Returns true once every signal has arrived.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.remaining() == 0
    }

    /// Blocks until the latch opens.
    pub fn wait(&self) {
        let mut remaining = self.remaining.lock();
        while *remaining > 0 {
            self.cvar.wait(&mut remaining);
        }
    }

    /// Blocks until the latch opens or `timeout` elapses.
    ///
    /// Returns `true` if the latch opened, `false` if the timeout elapsed.
    /// A timeout too large to form a deadline waits without one.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait();
            return true;
        };
        let mut remaining = self.remaining.lock();
        while *remaining > 0 {
            if self.cvar.wait_until(&mut remaining, deadline).timed_out() {
                return *remaining == 0;
            }
        }
        true
    }
}
