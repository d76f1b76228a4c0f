//! Render interception.
//!
//! [`Toboggan`] installs itself as the render function for one engine name on
//! an application's engine table. Each render it intercepts drains the
//! registered checkers, settles them, stores the verdict for the completion
//! bridge and then reports a successful render, so the response is always
//! written and failures travel through the test's completion channel instead.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::Mutex;
use toboggan_domain::{ConfigurationError, ConfigurationResult, CycleId, RenderOptions, Verdict};
use tracing::{debug, info, warn};

use crate::aggregator::Aggregator;
use crate::bridge::CompletionBridge;
use crate::checker::Expectation;
use crate::config::InterceptorConfig;
use crate::error::RenderResult;
use crate::ports::{EngineHost, EngineTable, RenderEngine, SharedEngine};
use crate::registry::CheckerRegistry;

/// State owned by one interceptor.
#[derive(Debug, Default)]
pub(crate) struct Shared {
    pub(crate) registry: CheckerRegistry,
    /// Verdict of the last render cycle, waiting for the bridge.
    pub(crate) verdict: Mutex<Option<Verdict>>,
    binding: Mutex<Option<Binding>>,
    aggregator: Aggregator,
}

/// What occupied the engine table before installation.
struct Binding {
    host: Arc<dyn EngineHost>,
    engine: String,
    previous_table: EngineTable,
    previous: Option<SharedEngine>,
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("engine", &self.engine)
            .field("previous_engines", &self.previous_table.len())
            .field("replaced", &self.previous.is_some())
            .finish_non_exhaustive()
    }
}

/// Template render interceptor.
///
/// Cloning yields another handle to the same interceptor. Each instance keeps
/// its own registry, verdict slot and binding, so independent suites can use
/// separate instances side by side.
///
/// # Example
///
/// ```ignore
/// let toboggan = Toboggan::new();
/// toboggan.install(views.clone(), "jade")?;
///
/// let response = client
///     .get("/user")
///     .with_templates(&toboggan)
///     .expect_template("user.jade")?
///     .end()
///     .await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Toboggan {
    shared: Arc<Shared>,
}

impl Toboggan {
    /// Creates an interceptor that waits indefinitely for its checkers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an interceptor with the given settings.
    #[must_use]
    pub fn with_config(config: &InterceptorConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                aggregator: Aggregator::new().with_timeout(config.settle_timeout()),
                ..Shared::default()
            }),
        }
    }

    /// Installs the interceptor as the render function for `engine` on `host`.
    ///
    /// The host's whole engine table is snapshotted first so `uninstall` can
    /// restore it.
    ///
    /// # Errors
    ///
    /// Returns `MissingEngineName` for an empty name and `AlreadyInstalled`
    /// if this instance is already bound.
    pub fn install<H>(&self, host: H, engine: &str) -> ConfigurationResult<&Self>
    where
        H: EngineHost + 'static,
    {
        if engine.trim().is_empty() {
            return Err(ConfigurationError::MissingEngineName);
        }

        let mut binding = self.shared.binding.lock();
        if let Some(active) = binding.as_ref() {
            return Err(ConfigurationError::AlreadyInstalled {
                engine: active.engine.clone(),
            });
        }

        let host: Arc<dyn EngineHost> = Arc::new(host);
        let previous_table = host.engines();
        let previous = previous_table.get(engine).cloned();
        host.register_engine(
            engine,
            Arc::new(InterceptingEngine {
                shared: Arc::downgrade(&self.shared),
            }),
        );
        info!(engine, replaced = previous.is_some(), "template interceptor installed");

        *binding = Some(Binding {
            host,
            engine: engine.to_string(),
            previous_table,
            previous,
        });
        Ok(self)
    }

    /// Restores the engine table captured by `install`.
    ///
    /// Does nothing if the interceptor is not installed.
    pub fn uninstall(&self) {
        let Some(binding) = self.shared.binding.lock().take() else {
            return;
        };
        info!(
            engine = %binding.engine,
            restored_previous = binding.previous.is_some(),
            "template interceptor uninstalled"
        );
        binding.host.replace_engines(binding.previous_table);
    }

    /// Returns the engine name this instance is installed under.
    #[must_use]
    pub fn installed_engine(&self) -> Option<String> {
        self.shared
            .binding
            .lock()
            .as_ref()
            .map(|binding| binding.engine.clone())
    }

    /// Registers a template name or checker for the next render cycle.
    ///
    /// Accepts anything convertible to an [`Expectation`]: a `&str`, a
    /// `String`, a [`Checker`](crate::Checker) or a JSON value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the expectation is neither a template
    /// name nor a checker; nothing is registered in that case.
    pub fn expect_template<E>(&self, expectation: E) -> ConfigurationResult<&Self>
    where
        E: TryInto<Expectation>,
        ConfigurationError: From<E::Error>,
    {
        let checker = expectation.try_into()?.into_checker();
        debug!(checker = checker.label(), "template expectation registered");
        self.shared.registry.register(checker);
        Ok(self)
    }

    /// Returns the number of checkers waiting for the next render.
    #[must_use]
    pub fn pending_checkers(&self) -> usize {
        self.shared.registry.len()
    }

    /// Returns true if a verdict is waiting for the completion bridge.
    #[must_use]
    pub fn has_pending_verdict(&self) -> bool {
        self.shared.verdict.lock().is_some()
    }

    /// Returns the bridge that merges verdicts into driver outcomes.
    #[must_use]
    pub fn bridge(&self) -> CompletionBridge {
        CompletionBridge::new(Arc::clone(&self.shared))
    }
}

/// Render function registered in the host's table while installed.
struct InterceptingEngine {
    shared: Weak<Shared>,
}

#[async_trait]
impl RenderEngine for InterceptingEngine {
    async fn render(&self, path: &str, options: &RenderOptions) -> RenderResult<String> {
        let Some(shared) = self.shared.upgrade() else {
            warn!(path, "template interceptor dropped while still installed");
            return Ok(String::new());
        };

        let cycle = CycleId::generate();
        let checkers = shared.registry.drain_all();
        debug!(%cycle, path, checkers = checkers.len(), "intercepted template render");

        let verdict = shared.aggregator.settle(checkers, path, options).await;
        match verdict.failure() {
            Some(failure) => debug!(%cycle, error = %failure, "template checkers failed"),
            None => debug!(%cycle, "template checkers passed"),
        }

        *shared.verdict.lock() = Some(verdict);
        Ok(String::new())
    }
}
