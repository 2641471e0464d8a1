//! Sequential coordinator.
//!
//! Walks the children in argument order on the composite's own thread,
//! starting each one and waiting for it to finish before touching the
//! next. Only this thread is serialized; siblings of the composite keep
//! running.

use tracing::{debug, trace, warn};

use crate::combinator::ensure_fresh;
use crate::error::Error;
use crate::future::Task;

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
        warn!(future_id = %composite.id(), error = %err, "sequential batch rejected at start");
        let _ = task.fail_with(err);
        return;
    }

    debug!(future_id = %composite.id(), children = children.len(), "sequential batch running");
    let mut launch_error: Option<Error> = None;
    for (position, child) in children.iter().enumerate() {
        trace!(future_id = %composite.id(), position, child = %child.id(), "running child");
        if let Err(err) = child.start_with(task.context().clone()) {
            warn!(future_id = %composite.id(), position, error = %err, "child start failed");
            launch_error.get_or_insert(err.with_position(position));
        }
        let _ = child.wait_with(task.context().clone());
    }

    debug!(future_id = %composite.id(), "sequential batch finished");
    let _ = match launch_error {
        Some(err) => task.fail_with(err),
        None => task.done_empty(),
    };
}

#[cfg(test)]
mod tests {
    use crate::combinator::{parallel, sequential};
    use crate::future::Future;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn init_test(name: &str) {
        crate::test_utils::init_test_logging();
        crate::test_phase!(name);
    }

    type Log = Arc<Mutex<Vec<String>>>;

    fn traced(log: &Log, label: &'static str, ms: u64) -> Future {
        let log = Arc::clone(log);
        Future::new(move |task| {
            log.lock().push(format!("start {label}"));
            thread::sleep(Duration::from_millis(ms));
            log.lock().push(format!("end {label}"));
            let _ = task.done_empty();
        })
    }

    #[test]
    fn children_never_overlap() {
        init_test("children_never_overlap");
        let log = Log::default();
        let root = sequential([
            traced(&log, "c1", 30),
            traced(&log, "c2", 0),
            traced(&log, "c3", 10),
        ])
        .expect("valid");
        assert!(root.wait().is_ok());
        assert_eq!(
            *log.lock(),
            vec!["start c1", "end c1", "start c2", "end c2", "start c3", "end c3"]
        );
        crate::test_complete!("children_never_overlap");
    }

    #[test]
    fn later_children_stay_unstarted_while_earlier_runs() {
        init_test("later_children_stay_unstarted_while_earlier_runs");
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let first = Future::new(move |task| {
            let _ = release_rx.recv();
            let _ = task.done_empty();
        });
        let second = Future::new(|task| {
            let _ = task.done_empty();
        });
        let root = sequential([first.clone(), second.clone()]).expect("valid");
        root.start().expect("start");
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !first.is_pending() && std::time::Instant::now() < deadline {
            thread::yield_now();
        }
        assert!(first.is_pending());
        assert!(second.is_not_started());
        release_tx.send(()).expect("release");
        assert!(root.wait().is_ok());
        assert!(second.is_finished());
        crate::test_complete!("later_children_stay_unstarted_while_earlier_runs");
    }

    #[test]
    fn failing_child_does_not_stop_chain() {
        init_test("failing_child_does_not_stop_chain");
        let log = Log::default();
        let failing = Future::new(|task| {
            let _ = task.fail_with(crate::error::Error::internal("boom"));
        });
        let root = sequential([failing, traced(&log, "after", 0)]).expect("valid");
        assert!(root.wait().is_ok());
        assert_eq!(*log.lock(), vec!["start after", "end after"]);
        crate::test_complete!("failing_child_does_not_stop_chain");
    }

    #[test]
    fn chain_runs_beside_parallel_siblings() {
        init_test("chain_runs_beside_parallel_siblings");
        let log = Log::default();
        let chain = sequential([traced(&log, "c1", 60), traced(&log, "c2", 60)]).expect("valid");
        let root = parallel([chain, traced(&log, "side", 20)]).expect("valid");
        assert!(root.wait().is_ok());
        let entries = log.lock().clone();
        let side_end = entries.iter().position(|e| e == "end side");
        let c1_end = entries.iter().position(|e| e == "end c1");
        assert!(side_end < c1_end, "sibling finished while chain was busy: {entries:?}");
        crate::test_complete!("chain_runs_beside_parallel_siblings");
    }
}
