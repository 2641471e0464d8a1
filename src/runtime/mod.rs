//! Engine configuration and handler launching.
//!
//! - [`config`]: Engine configuration types
//! - [`env_config`]: `CONDUCTOR_*` environment overrides
//! - [`builder`]: Engine builder and the [`Engine`] handle
//!
//! # Quick Start
//!
//! ```
//! use conductor::runtime::EngineBuilder;
//!
//! let engine = EngineBuilder::new().thread_name_prefix("etl").build();
//! let future = engine.future(|task| {
//!     let _ = task.done(42_u32);
//! });
//! assert_eq!(future.wait().value_as::<u32>(), Some(&42));
//! ```
//!
//! # Environment Overrides
//!
//! ```no_run
//! use conductor::runtime::EngineBuilder;
//!
//! let engine = EngineBuilder::new().with_env_overrides()?.build();
//! # Ok::<(), conductor::Error>(())
//! ```

pub mod builder;
pub mod config;
pub mod env_config;

pub use builder::{Engine, EngineBuilder};
pub use config::{EngineConfig, ThreadCallback, DEFAULT_THREAD_NAME_PREFIX};
pub use env_config::{
    apply_env_overrides, ConfigError, ENV_INLINE_FALLBACK, ENV_THREAD_NAME_PREFIX,
    ENV_THREAD_STACK_SIZE,
};
