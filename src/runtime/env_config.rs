//! Environment variable support for [`EngineBuilder`](super::builder::EngineBuilder).
//!
//! # Configuration Precedence
//!
//! 1. **Programmatic**: values set via builder methods
//! 2. **Environment variables**: values from `CONDUCTOR_*` env vars
//! 3. **Defaults**: built-in defaults from [`EngineConfig::default()`]
//!
//! # Supported Environment Variables
//!
//! | Variable | Type | Maps to |
//! |----------|------|---------|
//! | `CONDUCTOR_THREAD_NAME_PREFIX` | `String` | `thread_name_prefix` |
//! | `CONDUCTOR_THREAD_STACK_SIZE` | `usize` | `thread_stack_size` |
//! | `CONDUCTOR_INLINE_FALLBACK` | `bool` | `inline_fallback` |

use crate::error::{Error, ErrorKind};
use crate::runtime::config::EngineConfig;

/// Environment variable name for the handler thread name prefix.
pub const ENV_THREAD_NAME_PREFIX: &str = "CONDUCTOR_THREAD_NAME_PREFIX";
/// Environment variable name for the handler thread stack size.
pub const ENV_THREAD_STACK_SIZE: &str = "CONDUCTOR_THREAD_STACK_SIZE";
/// Environment variable name for the inline fallback toggle.
pub const ENV_INLINE_FALLBACK: &str = "CONDUCTOR_INLINE_FALLBACK";

/// Errors produced while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but its value cannot be parsed.
    #[error("invalid value for {var}: expected {expected}, got {value:?}")]
    InvalidValue {
        /// Environment variable name.
        var: &'static str,
        /// Description of the accepted values.
        expected: &'static str,
        /// The rejected raw value.
        value: String,
    },
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::InvalidConfig).with_message(err.to_string())
    }
}

/// Apply environment variable overrides to an [`EngineConfig`].
///
/// Only variables that are set in the environment are applied.
/// Returns an error if a variable is set but contains an unparseable value.
pub fn apply_env_overrides(config: &mut EngineConfig) -> Result<(), ConfigError> {
    if let Some(val) = read_env(ENV_THREAD_NAME_PREFIX) {
        config.thread_name_prefix = val;
    }
    if let Some(val) = read_env(ENV_THREAD_STACK_SIZE) {
        config.thread_stack_size = parse_usize(ENV_THREAD_STACK_SIZE, &val)?;
    }
    if let Some(val) = read_env(ENV_INLINE_FALLBACK) {
        config.inline_fallback = parse_bool(ENV_INLINE_FALLBACK, &val)?;
    }
    Ok(())
}

/// Read an environment variable, returning `None` if unset.
fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn parse_usize(var: &'static str, val: &str) -> Result<usize, ConfigError> {
    val.trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::InvalidValue {
            var,
            expected: "unsigned integer",
            value: val.to_string(),
        })
}

fn parse_bool(var: &'static str, val: &str) -> Result<bool, ConfigError> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            expected: "bool (true/false/1/0/yes/no)",
            value: val.to_string(),
        }),
    }
}
