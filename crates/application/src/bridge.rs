//! Completion bridge between render verdicts and the test driver's outcome.

use std::sync::Arc;

use thiserror::Error;
use toboggan_domain::{CheckFailure, Verdict};
use tracing::{debug, warn};

use crate::interceptor::Shared;

/// Failure delivered to the test at the end of a request cycle.
#[derive(Debug, Error)]
pub enum TemplateTestError<F> {
    /// A template checker failed. Takes precedence over driver failures.
    #[error("{0}")]
    Template(CheckFailure),

    /// The driver's own response assertions failed.
    #[error("{0}")]
    Driver(F),
}

impl<F> TemplateTestError<F> {
    /// Returns the checker failure, if that is what this is.
    #[must_use]
    pub const fn template_failure(&self) -> Option<&CheckFailure> {
        match self {
            Self::Template(failure) => Some(failure),
            Self::Driver(_) => None,
        }
    }

    /// Returns the driver failure, if that is what this is.
    #[must_use]
    pub const fn driver_failure(&self) -> Option<&F> {
        match self {
            Self::Template(_) => None,
            Self::Driver(failure) => Some(failure),
        }
    }
}

/// Merges the pending verdict into a driver's completion.
///
/// Each merge consumes the verdict, so it can affect only one cycle. When no
/// render happened during the cycle the driver's outcome passes through
/// unchanged.
#[derive(Debug, Clone)]
pub struct CompletionBridge {
    shared: Arc<Shared>,
}

impl CompletionBridge {
    pub(crate) const fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Takes the verdict of the last render and resets the cycle.
    ///
    /// Checkers registered but never run are discarded with a warning.
    pub fn take_verdict(&self) -> Option<Verdict> {
        let verdict = self.shared.verdict.lock().take();
        let stale = self.shared.registry.drain_all();
        if !stale.is_empty() {
            warn!(
                discarded = stale.len(),
                rendered = verdict.is_some(),
                "template expectations never ran during this request"
            );
        }
        verdict
    }

    /// Merges the pending verdict into `outcome`.
    ///
    /// # Errors
    ///
    /// Returns `Template` if a checker failed, otherwise the driver's own
    /// failure as `Driver`.
    pub fn merge<R, F>(&self, outcome: Result<R, F>) -> Result<R, TemplateTestError<F>> {
        self.merge_with(outcome, |failure| failure.map_or(Ok(()), Err))
    }

    /// Merges the pending verdict into `outcome`, letting `handler` decide on it first.
    ///
    /// `handler` runs only if a render happened. It receives the checker
    /// failure, if any; returning `Ok(())` marks the verdict as handled and
    /// returning an error makes that error the template failure.
    ///
    /// # Errors
    ///
    /// Returns `Template` if the handler rejected the verdict, otherwise the
    /// driver's own failure as `Driver`.
    pub fn merge_with<R, F, H>(
        &self,
        outcome: Result<R, F>,
        handler: H,
    ) -> Result<R, TemplateTestError<F>>
    where
        H: FnOnce(Option<CheckFailure>) -> Result<(), CheckFailure>,
    {
        let Some(verdict) = self.take_verdict() else {
            return outcome.map_err(TemplateTestError::Driver);
        };

        match handler(verdict.into_failure()) {
            Err(failure) => {
                debug!(error = %failure, driver_failed = outcome.is_err(), "reporting template failure");
                Err(TemplateTestError::Template(failure))
            }
            Ok(()) => outcome.map_err(TemplateTestError::Driver),
        }
    }

    /// Wraps a callback-style completion hook so it receives merged outcomes.
    pub fn wrap<R, F, H>(&self, hook: H) -> impl FnOnce(Result<R, F>) + use<R, F, H>
    where
        H: FnOnce(Result<R, TemplateTestError<F>>),
    {
        let bridge = self.clone();
        move |outcome| hook(bridge.merge(outcome))
    }
}
