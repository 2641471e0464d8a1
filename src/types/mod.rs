//! Core types for the conductor engine.
//!
//! - [`id`]: Identifier type for futures (`FutureId`)
//! - [`state`]: The three-state future lifecycle
//! - [`outcome`]: Terminal outcome of a future and the opaque `Value` it carries

pub mod id;
pub mod outcome;
pub mod state;

pub use id::FutureId;
pub use outcome::{Outcome, PanicPayload, Value};
pub use state::State;
