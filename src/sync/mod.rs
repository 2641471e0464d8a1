//! Synchronization primitives used by the combinator engine.
//!
//! # Primitives
//!
//! - [`Latch`]: One-shot countdown used by the parallel coordinator to
//!   block until every child has signalled completion
//! - [`CancelToken`]: Shared cancellation flag carried by a choreography
//!   context and checked by leaf handlers at their own discretion

mod cancel;
mod latch;

pub use cancel::CancelToken;
pub use latch::Latch;
