//! Template checkers and the signal they report through.
//!
//! A checker is invoked once per render cycle with the rendered template path
//! and the render options. It reports its result by consuming its [`Signal`],
//! either before returning or later from a spawned task or timer.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::oneshot;
use toboggan_domain::{
    CheckFailure, CheckerPanicked, ConfigurationError, RenderOptions,
    assert_equal, basename,
};

/// Result a checker reports.
pub type CheckResult = Result<(), CheckFailure>;

/// One-shot channel a checker reports its result through.
///
/// Consuming `self` makes a second report impossible.
#[derive(Debug)]
pub struct Signal {
    sender: oneshot::Sender<CheckResult>,
}

impl Signal {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<CheckResult>) {
        let (sender, receiver) = oneshot::channel();
        (Self { sender }, receiver)
    }

    /// Reports success.
    pub fn pass(self) {
        self.send(Ok(()));
    }

    /// Reports a failure.
    pub fn fail(self, failure: impl Into<CheckFailure>) {
        self.send(Err(failure.into()));
    }

    /// Reports a result.
    pub fn send(self, result: CheckResult) {
        if self.sender.send(result).is_err() {
            tracing::trace!("checker signalled after its settlement was abandoned");
        }
    }
}

/// A deferred verification run against one template render.
pub trait TemplateCheck: Send + Sync {
    /// Runs the check.
    ///
    /// The implementation must consume `signal` exactly once, now or later.
    ///
    /// # Errors
    ///
    /// Returning an error is equivalent to signalling it, unless the signal
    /// was already used.
    fn check(&self, path: &str, options: &RenderOptions, signal: Signal) -> CheckResult;
}

/// Compares the basename of the rendered path with an expected template name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateName(String);

impl TemplateName {
    /// Creates the check.
    pub fn new(expected: impl Into<String>) -> Self {
        Self(expected.into())
    }

    /// Returns the expected template name.
    #[must_use]
    pub fn expected(&self) -> &str {
        &self.0
    }
}

impl TemplateCheck for TemplateName {
    fn check(&self, path: &str, _options: &RenderOptions, signal: Signal) -> CheckResult {
        signal.send(assert_equal(basename(path), &self.0).map_err(CheckFailure::from));
        Ok(())
    }
}

/// Check backed by a signal-style closure.
pub(crate) struct FnCheck<F>(F);

impl<F> TemplateCheck for FnCheck<F>
where
    F: Fn(&str, &RenderOptions, Signal) -> CheckResult + Send + Sync,
{
    fn check(&self, path: &str, options: &RenderOptions, signal: Signal) -> CheckResult {
        (self.0)(path, options, signal)
    }
}

/// Check backed by a closure returning a future.
///
/// The future is spawned on the current tokio runtime and its output is
/// signalled when it completes.
pub(crate) struct FutureCheck<F>(F);

impl<F, Fut> TemplateCheck for FutureCheck<F>
where
    F: Fn(String, RenderOptions) -> Fut + Send + Sync,
    Fut: Future<Output = CheckResult> + Send + 'static,
{
    fn check(&self, path: &str, options: &RenderOptions, signal: Signal) -> CheckResult {
        let pending = (self.0)(path.to_string(), options.clone());
        tokio::spawn(async move {
            signal.send(pending.await);
        });
        Ok(())
    }
}

/// A registered checker.
#[derive(Clone)]
pub struct Checker {
    label: String,
    check: Arc<dyn TemplateCheck>,
}

impl Checker {
    /// Wraps any `TemplateCheck`.
    pub fn new(label: impl Into<String>, check: impl TemplateCheck + 'static) -> Self {
        Self {
            label: label.into(),
            check: Arc::new(check),
        }
    }

    /// Checker expecting the rendered template's basename to equal `expected`.
    pub fn template(expected: impl Into<String>) -> Self {
        let expected = expected.into();
        Self::new(format!("template '{expected}'"), TemplateName::new(expected))
    }

    /// Checker from a closure receiving `(path, options, signal)`.
    pub fn from_fn<F>(check: F) -> Self
    where
        F: Fn(&str, &RenderOptions, Signal) -> CheckResult + Send + Sync + 'static,
    {
        Self::new("custom checker", FnCheck(check))
    }

    /// Checker from a closure returning a future of the result.
    pub fn from_future<F, Fut>(check: F) -> Self
    where
        F: Fn(String, RenderOptions) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CheckResult> + Send + 'static,
    {
        Self::new("async checker", FutureCheck(check))
    }

    /// Replaces the label used in logs and failures.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Returns the label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Invokes the check, turning a panic into a failure.
    pub(crate) fn invoke(&self, path: &str, options: &RenderOptions, signal: Signal) -> CheckResult {
        panic::catch_unwind(AssertUnwindSafe(|| self.check.check(path, options, signal)))
            .unwrap_or_else(|payload| {
                Err(CheckerPanicked {
                    checker: self.label.clone(),
                    message: panic_message(&*payload),
                }
                .into())
            })
    }
}

impl fmt::Debug for Checker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checker")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// Argument accepted by `expect_template`: a template name or a checker.
#[derive(Debug, Clone)]
pub enum Expectation {
    /// Expected basename of the rendered template.
    Template(String),
    /// Arbitrary checker.
    Checker(Checker),
}

impl Expectation {
    /// Turns the expectation into a checker.
    ///
    /// Any string is a template name, the empty one included; it simply
    /// fails its comparison at render time.
    #[must_use]
    pub fn into_checker(self) -> Checker {
        match self {
            Self::Template(name) => Checker::template(name),
            Self::Checker(checker) => checker,
        }
    }
}

impl From<&str> for Expectation {
    fn from(name: &str) -> Self {
        Self::Template(name.to_string())
    }
}

impl From<String> for Expectation {
    fn from(name: String) -> Self {
        Self::Template(name)
    }
}

impl From<Checker> for Expectation {
    fn from(checker: Checker) -> Self {
        Self::Checker(checker)
    }
}

impl TryFrom<&Value> for Expectation {
    type Error = ConfigurationError;

    /// Reads an expectation from data, e.g. a test case loaded from JSON.
    ///
    /// Only strings are accepted; `null` stands for a missing argument.
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(name) => Ok(Self::Template(name.clone())),
            Value::Null => Err(ConfigurationError::invalid_argument(
                "must pass either one template name or one checker",
            )),
            other => Err(ConfigurationError::invalid_argument(format!(
                "must pass either one template name or one checker, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use toboggan_domain::AssertionFailure;

    fn run(checker: &Checker, path: &str) -> (CheckResult, Option<CheckResult>) {
        let (signal, mut receiver) = Signal::channel();
        let returned = checker.invoke(path, &RenderOptions::new(), signal);
        (returned, receiver.try_recv().ok())
    }

    #[test]
    fn test_template_name_matches_basename() {
        let checker = Checker::template("user.jade");
        let (returned, signalled) = run(&checker, "/srv/app/views/user.jade");
        assert!(returned.is_ok());
        assert!(signalled.unwrap().is_ok());
    }

    #[test]
    fn test_template_name_mismatch_signals_assertion_error() {
        let checker = Checker::template("user.jade");
        let (_, signalled) = run(&checker, "/srv/app/views/other.jade");

        let failure = signalled.unwrap().unwrap_err();
        let expected = assert_equal("other.jade", "user.jade").unwrap_err();
        assert_eq!(failure.downcast_ref::<AssertionFailure>(), Some(&expected));
    }

    #[test]
    fn test_panicking_checker_becomes_failure() {
        let checker = Checker::from_fn(|_, _, _| panic!("exploded")).with_label("boom");
        let (returned, _) = run(&checker, "user.jade");

        let failure = returned.unwrap_err();
        let panicked = failure.downcast_ref::<CheckerPanicked>().unwrap();
        assert_eq!(panicked.checker, "boom");
        assert_eq!(panicked.message, "exploded");
    }

    #[test]
    fn test_empty_name_is_a_template_expectation() {
        let checker = Expectation::from("").into_checker();
        assert_eq!(checker.label(), "template ''");

        let (_, signalled) = run(&checker, "/srv/app/views/user.jade");
        let failure = signalled.unwrap().unwrap_err();
        let expected = assert_equal("user.jade", "").unwrap_err();
        assert_eq!(failure.downcast_ref::<AssertionFailure>(), Some(&expected));
    }

    #[test]
    fn test_expectation_from_json() {
        assert!(matches!(
            Expectation::try_from(&json!("user.jade")).unwrap(),
            Expectation::Template(name) if name == "user.jade"
        ));
        assert!(matches!(
            Expectation::try_from(&Value::Null),
            Err(ConfigurationError::InvalidArgument(_))
        ));
        assert!(matches!(
            Expectation::try_from(&json!(42)),
            Err(ConfigurationError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_checker_labels() {
        assert_eq!(Checker::template("user.jade").label(), "template 'user.jade'");
        assert_eq!(
            Checker::from_fn(|_, _, signal| {
                signal.pass();
                Ok(())
            })
            .label(),
            "custom checker"
        );
    }

    #[tokio::test]
    async fn test_future_checker_signals_output() {
        let checker = Checker::from_future(|path, _| async move {
            if path.ends_with("user.jade") {
                Ok(())
            } else {
                Err(CheckFailure::msg("wrong template"))
            }
        });

        let (signal, receiver) = Signal::channel();
        checker
            .invoke("/views/other.jade", &RenderOptions::new(), signal)
            .unwrap();

        let failure = receiver.await.unwrap().unwrap_err();
        assert_eq!(failure.to_string(), "wrong template");
    }
}
