//! Batch combinators.
//!
//! A combinator turns a list of fresh child futures into one composite
//! future whose handler coordinates the children:
//!
//! - [`parallel`]: start every child at once, finish when all have finished
//! - [`sequential`]: start each child only after the previous one finished
//!
//! Composites are ordinary futures, so they nest freely. A child must be
//! `NotStarted` when it is handed to a combinator; this rules out reuse of a
//! future in two places of a tree and therefore cycles.
//!
//! Composites always finish with `Ok(None)`. Child values and failures are
//! not aggregated; read them from [`Future::children`].
//!
//! ```
//! use conductor::{parallel, sequential, Future};
//!
//! let leaf = |label: &'static str| Future::new(move |task| {
//!     let _ = task.done(label);
//! });
//! let chain = sequential([leaf("c"), leaf("d")])?;
//! let root = parallel([leaf("a"), chain])?;
//! assert!(root.wait().is_ok());
//! assert_eq!(root.children()?.len(), 2);
//! # Ok::<(), conductor::Error>(())
//! ```

pub(crate) mod chain;
pub(crate) mod fan_out;

use core::fmt;
use std::any::Any;

use tracing::debug;

use crate::error::{Error, Result};
use crate::future::Future;
use crate::runtime::Engine;

/// How a composite future runs its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// All children run concurrently; the composite waits for every one.
    Parallel,
    /// Children run one after another in argument order.
    Sequential,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parallel => f.write_str("parallel"),
            Self::Sequential => f.write_str("sequential"),
        }
    }
}

/// A dynamically typed combinator argument.
///
/// Used by [`parallel_any`] and [`sequential_any`] when a tree is assembled
/// from heterogeneous input; every entry must hold a [`Future`].
pub type BatchArg = Box<dyn Any + Send>;

/// Wraps a future as a [`BatchArg`].
#[must_use]
pub fn batch_arg(future: Future) -> BatchArg {
    Box::new(future)
}

/// Builds a parallel composite on the global engine.
///
/// Fails with `EmptyBatch` for an empty list and with `ChildNotFresh` or
/// `DuplicateChild` (carrying the argument position) for a child that cannot
/// be adopted.
pub fn parallel<I>(children: I) -> Result<Future>
where
    I: IntoIterator<Item = Future>,
{
    Engine::global().parallel(children)
}

/// Builds a sequential composite on the global engine.
pub fn sequential<I>(children: I) -> Result<Future>
where
    I: IntoIterator<Item = Future>,
{
    Engine::global().sequential(children)
}

/// Builds a composite with an explicit strategy on the global engine.
pub fn batch<I>(strategy: Strategy, children: I) -> Result<Future>
where
    I: IntoIterator<Item = Future>,
{
    Engine::global().batch(strategy, children)
}

/// Builds a parallel composite from dynamically typed arguments.
///
/// An entry that is not a [`Future`] fails with `NotAFuture` at its
/// position.
pub fn parallel_any(args: Vec<BatchArg>) -> Result<Future> {
    Engine::global().batch_any(Strategy::Parallel, args)
}

/// Builds a sequential composite from dynamically typed arguments.
pub fn sequential_any(args: Vec<BatchArg>) -> Result<Future> {
    Engine::global().batch_any(Strategy::Sequential, args)
}

/// Builds a composite from dynamically typed arguments on the global engine.
pub fn batch_any(strategy: Strategy, args: Vec<BatchArg>) -> Result<Future> {
    Engine::global().batch_any(strategy, args)
}

/// Checks that `children` can be adopted by a new composite.
pub(crate) fn validate_children(children: &[Future]) -> Result<()> {
    if children.is_empty() {
        return Err(Error::empty_batch());
    }
    ensure_fresh(children)?;
    for (position, child) in children.iter().enumerate() {
        if let Some(first) = children[..position]
            .iter()
            .position(|earlier| earlier.ptr_eq(child))
        {
            return Err(Error::duplicate_child(position, first, child.id()));
        }
    }
    Ok(())
}

/// Checks that no child has been started yet.
pub(crate) fn ensure_fresh(children: &[Future]) -> Result<()> {
    for (position, child) in children.iter().enumerate() {
        let state = child.state();
        if state != crate::types::State::NotStarted {
            debug!(position, future_id = %child.id(), state = %state, "child is not fresh");
            return Err(Error::child_not_fresh(position, child.id(), state));
        }
    }
    Ok(())
}

/// Recovers futures from dynamically typed arguments.
pub(crate) fn downcast_args(args: Vec<BatchArg>) -> Result<Vec<Future>> {
    args.into_iter()
        .enumerate()
        .map(|(position, arg)| {
            arg.downcast::<Future>()
                .map(|future| *future)
                .map_err(|_| Error::not_a_future(position))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::State;

    fn init_test(name: &str) {
        crate::test_utils::init_test_logging();
        crate::test_phase!(name);
    }

    fn leaf() -> Future {
        Future::new(|task| {
            let _ = task.done_empty();
        })
    }

    #[test]
    fn empty_batch_is_rejected() {
        init_test("empty_batch_is_rejected");
        for strategy in [Strategy::Parallel, Strategy::Sequential] {
            let err = batch(strategy, Vec::new()).expect_err("empty batch");
            assert_eq!(err.kind(), ErrorKind::EmptyBatch);
        }
        crate::test_complete!("empty_batch_is_rejected");
    }

    #[test]
    fn started_child_is_rejected_with_position() {
        init_test("started_child_is_rejected_with_position");
        let running = leaf();
        let _ = running.wait();
        let err = parallel([leaf(), leaf(), running.clone()]).expect_err("reused child");
        assert_eq!(err.kind(), ErrorKind::ChildNotFresh);
        assert_eq!(err.position(), Some(2));
        assert_eq!(err.context().state, Some(State::Finished));
        assert_eq!(err.context().future_id, Some(running.id()));
        crate::test_complete!("started_child_is_rejected_with_position");
    }

    #[test]
    fn duplicate_child_is_rejected() {
        init_test("duplicate_child_is_rejected");
        let shared = leaf();
        let err = sequential([leaf(), shared.clone(), shared]).expect_err("duplicate");
        assert_eq!(err.kind(), ErrorKind::DuplicateChild);
        assert_eq!(err.position(), Some(2));
        crate::test_complete!("duplicate_child_is_rejected");
    }

    #[test]
    fn non_future_argument_reports_position() {
        init_test("non_future_argument_reports_position");
        let args: Vec<BatchArg> = vec![batch_arg(leaf()), Box::new("not a future"), batch_arg(leaf())];
        let err = parallel_any(args).expect_err("bad argument");
        assert_eq!(err.kind(), ErrorKind::NotAFuture);
        assert_eq!(err.position(), Some(1));
        crate::test_complete!("non_future_argument_reports_position");
    }

    #[test]
    fn dynamic_arguments_build_composite() {
        init_test("dynamic_arguments_build_composite");
        let args: Vec<BatchArg> = vec![batch_arg(leaf()), batch_arg(leaf())];
        let root = sequential_any(args).expect("valid arguments");
        assert_eq!(root.strategy(), Some(Strategy::Sequential));
        assert!(root.wait().is_ok());
        crate::test_complete!("dynamic_arguments_build_composite");
    }

    #[test]
    fn composite_exposes_children_in_order() {
        init_test("composite_exposes_children_in_order");
        let a = leaf();
        let b = leaf();
        let root = parallel([a.clone(), b.clone()]).expect("valid");
        assert!(root.is_batch());
        assert!(root.is_not_started());
        let children = root.children().expect("batch");
        assert_eq!(children.len(), 2);
        assert!(children[0].ptr_eq(&a));
        assert!(children[1].ptr_eq(&b));
        assert_eq!(Strategy::Parallel.to_string(), "parallel");
        crate::test_complete!("composite_exposes_children_in_order");
    }
}
