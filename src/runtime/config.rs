//! Engine configuration types.
//!
//! These types hold the concrete values that drive how handlers are
//! launched. In most cases you should use
//! [`EngineBuilder`](super::builder::EngineBuilder) rather than creating an
//! [`EngineConfig`] directly.
//!
//! # Defaults
//!
//! | Field | Default |
//! |-------|---------|
//! | `thread_name_prefix` | `"conductor-task"` |
//! | `thread_stack_size` | 0 (platform default) |
//! | `inline_fallback` | false |

use std::fmt;
use std::sync::Arc;

/// Default name prefix for handler threads.
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "conductor-task";

/// Callback invoked on handler thread start or stop.
pub type ThreadCallback = Arc<dyn Fn() + Send + Sync>;

/// Engine configuration.
#[derive(Clone)]
pub struct EngineConfig {
    /// Name prefix for handler threads.
    pub thread_name_prefix: String,
    /// Stack size per handler thread in bytes (0 = platform default).
    pub thread_stack_size: usize,
    /// Run the handler on the calling thread when a thread cannot be spawned.
    ///
    /// Off by default: a spawn failure fails the future. When enabled,
    /// `start()` blocks for as long as the handler runs.
    pub inline_fallback: bool,
    /// Callback executed when a handler thread starts.
    pub on_thread_start: Option<ThreadCallback>,
    /// Callback executed when a handler thread stops.
    pub on_thread_stop: Option<ThreadCallback>,
}

impl EngineConfig {
    /// Normalize configuration values to safe defaults.
    pub fn normalize(&mut self) {
        if self.thread_name_prefix.trim().is_empty() {
            self.thread_name_prefix = DEFAULT_THREAD_NAME_PREFIX.to_string();
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
            thread_stack_size: 0,
            inline_fallback: false,
            on_thread_start: None,
            on_thread_stop: None,
        }
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("thread_name_prefix", &self.thread_name_prefix)
            .field("thread_stack_size", &self.thread_stack_size)
            .field("inline_fallback", &self.inline_fallback)
            .field("on_thread_start", &self.on_thread_start.is_some())
            .field("on_thread_stop", &self.on_thread_stop.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_test(name: &str) {
        crate::test_utils::init_test_logging();
        crate::test_phase!(name);
    }

    #[test]
    fn default_config_sane() {
        init_test("default_config_sane");
        let config = EngineConfig::default();
        crate::assert_with_log!(
            config.thread_name_prefix == DEFAULT_THREAD_NAME_PREFIX,
            "thread_name_prefix",
            DEFAULT_THREAD_NAME_PREFIX,
            config.thread_name_prefix
        );
        crate::assert_with_log!(
            config.thread_stack_size == 0,
            "thread_stack_size",
            0,
            config.thread_stack_size
        );
        assert!(!config.inline_fallback);
        crate::test_complete!("default_config_sane");
    }

    #[test]
    fn normalize_restores_blank_prefix() {
        init_test("normalize_restores_blank_prefix");
        let mut config = EngineConfig {
            thread_name_prefix: "   ".to_string(),
            ..EngineConfig::default()
        };
        config.normalize();
        assert_eq!(config.thread_name_prefix, DEFAULT_THREAD_NAME_PREFIX);
        crate::test_complete!("normalize_restores_blank_prefix");
    }

    #[test]
    fn debug_hides_callbacks() {
        let config = EngineConfig {
            on_thread_start: Some(Arc::new(|| {})),
            ..EngineConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(rendered.contains("on_thread_start: true"));
        assert!(rendered.contains("on_thread_stop: false"));
    }
}
