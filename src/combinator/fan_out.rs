//! Parallel coordinator.
//!
//! Runs on the composite's own thread: signs every child up to a shared
//! latch, starts them all in argument order and blocks until the latch
//! opens. The children run on their own threads, so the slowest branch
//! alone determines how long the composite stays pending.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::combinator::ensure_fresh;
use crate::error::Error;
use crate::future::Task;
use crate::sync::Latch;

pub(crate) fn run(task: Task) {
    let composite = task.future().clone();
    let children = match composite.children() {
        Ok(children) => children,
        Err(err) => {
            let _ = task.fail_with(err);
            return;
        }
    };
    if let Err(err) = ensure_fresh(children) {
        warn!(future_id = %composite.id(), error = %err, "parallel batch rejected at start");
        let _ = task.fail_with(err);
        return;
    }

    debug!(future_id = %composite.id(), children = children.len(), "parallel batch fanning out");
    let latch = Arc::new(Latch::new(children.len()));
    for child in children {
        let latch = Arc::clone(&latch);
        child.then(move |_| {
            latch.count_down();
        });
    }

    let mut launch_error: Option<Error> = None;
    for (position, child) in children.iter().enumerate() {
        trace!(future_id = %composite.id(), position, child = %child.id(), "starting child");
        if let Err(err) = child.start_with(task.context().clone()) {
            // The child was started elsewhere; its continuation still fires.
            warn!(future_id = %composite.id(), position, error = %err, "child start failed");
            launch_error.get_or_insert(err.with_position(position));
        }
    }

    latch.wait();
    debug!(future_id = %composite.id(), "parallel batch joined");
    let _ = match launch_error {
        Some(err) => task.fail_with(err),
        None => task.done_empty(),
    };
}
