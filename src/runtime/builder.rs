//! Engine builder and handles.

use parking_lot::Mutex;
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;
use tracing::{debug, trace, warn};

use crate::combinator::{self, BatchArg, Strategy};
use crate::error::Result;
use crate::future::{Future, Task};
use crate::runtime::config::EngineConfig;
use crate::runtime::env_config::apply_env_overrides;

static GLOBAL_ENGINE: OnceLock<Engine> = OnceLock::new();

/// Builder for constructing an engine with custom configuration.
#[derive(Clone, Debug, Default)]
pub struct EngineBuilder {
    config: EngineConfig,
}

impl EngineBuilder {
    /// Create a new builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    /// Set the handler thread name prefix.
    #[must_use]
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    /// Set the handler thread stack size (0 = platform default).
    #[must_use]
    pub fn thread_stack_size(mut self, size: usize) -> Self {
        self.config.thread_stack_size = size;
        self
    }

    /// Run handlers inline when a thread cannot be spawned.
    ///
    /// Off by default. With it on, `start()` runs the handler on the
    /// caller's thread after a spawn failure and blocks until it returns.
    #[must_use]
    pub fn inline_fallback(mut self, enable: bool) -> Self {
        self.config.inline_fallback = enable;
        self
    }

    /// Register a callback to run when a handler thread starts.
    #[must_use]
    pub fn on_thread_start<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.config.on_thread_start = Some(Arc::new(f));
        self
    }

    /// Register a callback to run when a handler thread stops.
    #[must_use]
    pub fn on_thread_stop<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.config.on_thread_stop = Some(Arc::new(f));
        self
    }

    /// Apply `CONDUCTOR_*` environment overrides on top of the current values.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        apply_env_overrides(&mut self.config)?;
        Ok(self)
    }

    /// Build an engine from this configuration.
    #[must_use]
    pub fn build(self) -> Engine {
        Engine::with_config(self.config)
    }
}

/// Launches future handlers on dedicated threads.
///
/// Every started future gets its own thread; a parallel group therefore
/// runs its branches truly concurrently and a sequential chain blocks only
/// its own coordinator thread. Futures remember the engine that built them.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    config: EngineConfig,
    next_thread_id: AtomicUsize,
}

impl Engine {
    /// Construct an engine from the given configuration.
    #[must_use]
    pub fn with_config(mut config: EngineConfig) -> Self {
        config.normalize();
        Self {
            inner: Arc::new(EngineInner {
                config,
                next_thread_id: AtomicUsize::new(0),
            }),
        }
    }

    /// Returns the process-wide engine used by the free constructors.
    ///
    /// It is configured from defaults plus environment overrides on first
    /// use. An unparsable override is logged and ignored.
    pub fn global() -> &'static Self {
        GLOBAL_ENGINE.get_or_init(|| match EngineBuilder::new().with_env_overrides() {
            Ok(builder) => builder.build(),
            Err(err) => {
                warn!(error = %err, "ignoring invalid engine environment overrides");
                EngineBuilder::new().build()
            }
        })
    }

    /// Returns a reference to the engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Returns how many handler threads this engine has spawned.
    #[must_use]
    pub fn threads_spawned(&self) -> usize {
        self.inner.next_thread_id.load(Ordering::Relaxed)
    }

    /// Returns true if both handles refer to the same engine.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Builds a leaf future on this engine.
    pub fn future<F>(&self, handler: F) -> Future
    where
        F: FnOnce(Task) + Send + 'static,
    {
        Future::leaf(self.clone(), None, Box::new(handler))
    }

    /// Builds a leaf future whose handler receives a typed argument pack.
    pub fn future_with_args<A, F>(&self, handler: F, args: A) -> Future
    where
        A: Send + 'static,
        F: FnOnce(Task, A) + Send + 'static,
    {
        Future::leaf(self.clone(), None, Box::new(move |task| handler(task, args)))
    }

    /// Builds a named leaf future; its value is published under `name`.
    pub fn named<F>(&self, name: impl Into<String>, handler: F) -> Future
    where
        F: FnOnce(Task) + Send + 'static,
    {
        Future::leaf(self.clone(), Some(name.into()), Box::new(handler))
    }

    /// Builds a parallel composite on this engine.
    pub fn parallel<I>(&self, children: I) -> Result<Future>
    where
        I: IntoIterator<Item = Future>,
    {
        self.batch(Strategy::Parallel, children)
    }

    /// Builds a sequential composite on this engine.
    pub fn sequential<I>(&self, children: I) -> Result<Future>
    where
        I: IntoIterator<Item = Future>,
    {
        self.batch(Strategy::Sequential, children)
    }

    /// Builds a composite with the given strategy on this engine.
    pub fn batch<I>(&self, strategy: Strategy, children: I) -> Result<Future>
    where
        I: IntoIterator<Item = Future>,
    {
        let children: Vec<Future> = children.into_iter().collect();
        combinator::validate_children(&children)?;
        Ok(Future::composite(self.clone(), strategy, children))
    }

    /// Builds a composite from dynamically typed arguments.
    pub fn batch_any(&self, strategy: Strategy, args: Vec<BatchArg>) -> Result<Future> {
        let children = combinator::downcast_args(args)?;
        self.batch(strategy, children)
    }

    /// Runs `job` on a fresh handler thread.
    ///
    /// If the thread cannot be spawned, the job runs inline when
    /// `inline_fallback` is set; otherwise the spawn error is returned and
    /// the job is dropped unrun.
    pub(crate) fn launch<F>(&self, job: F) -> io::Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let shared = Arc::new(Mutex::new(Some(job)));
        let thread_job = Arc::clone(&shared);
        let on_start = self.inner.config.on_thread_start.clone();
        let on_stop = self.inner.config.on_thread_stop.clone();

        let name = self.inner.next_thread_name();
        let mut builder = thread::Builder::new().name(name.clone());
        if self.inner.config.thread_stack_size > 0 {
            builder = builder.stack_size(self.inner.config.thread_stack_size);
        }

        let spawned = builder.spawn(move || {
            let job = thread_job.lock().take();
            let Some(job) = job else {
                return;
            };
            if let Some(callback) = on_start.as_ref() {
                callback();
            }
            job();
            if let Some(callback) = on_stop.as_ref() {
                callback();
            }
        });

        match spawned {
            Ok(_detached) => {
                trace!(thread = %name, "handler thread spawned");
                Ok(())
            }
            Err(err) if self.inner.config.inline_fallback => {
                warn!(thread = %name, error = %err, "thread spawn failed, running handler inline");
                let job = shared.lock().take();
                if let Some(job) = job {
                    job();
                }
                Ok(())
            }
            Err(err) => {
                debug!(thread = %name, error = %err, "thread spawn failed");
                Err(err)
            }
        }
    }
}

impl EngineInner {
    fn next_thread_name(&self) -> String {
        let id = self.next_thread_id.fetch_add(1, Ordering::Relaxed);
        format!("{}-{id}", self.config.thread_name_prefix)
    }
}

impl Default for Engine {
    fn default() -> Self {
        EngineBuilder::new().build()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.inner.config)
            .field("threads_spawned", &self.threads_spawned())
            .finish()
    }
}
