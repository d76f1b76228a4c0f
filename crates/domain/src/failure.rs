//! Failures produced by template checkers.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// An error signalled by a checker.
///
/// The wrapped value is shared, not copied: the error a checker signals is the
/// very value the test receives, which can be confirmed with [`ptr_eq`] or
/// recovered with [`downcast_ref`].
///
/// [`ptr_eq`]: CheckFailure::ptr_eq
/// [`downcast_ref`]: CheckFailure::downcast_ref
#[derive(Clone)]
pub struct CheckFailure {
    error: Arc<dyn Error + Send + Sync + 'static>,
}

impl CheckFailure {
    /// Wraps an arbitrary error.
    pub fn new<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            error: Arc::new(error),
        }
    }

    /// Creates a failure carrying only a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(CheckMessage(message.into()))
    }

    /// Returns the wrapped error as `E` if it has that type.
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Error + 'static,
    {
        self.error.downcast_ref::<E>()
    }

    /// Returns true if the wrapped error is of type `E`.
    #[must_use]
    pub fn is<E>(&self) -> bool
    where
        E: Error + 'static,
    {
        self.error.is::<E>()
    }

    /// Returns true if both failures wrap the same error value.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.error, &other.error)
    }
}

impl fmt::Debug for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.error, f)
    }
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.error, f)
    }
}

impl Error for CheckFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.error.source()
    }
}

impl From<AssertionFailure> for CheckFailure {
    fn from(error: AssertionFailure) -> Self {
        Self::new(error)
    }
}

impl From<SettleTimeout> for CheckFailure {
    fn from(error: SettleTimeout) -> Self {
        Self::new(error)
    }
}

impl From<SignalDropped> for CheckFailure {
    fn from(error: SignalDropped) -> Self {
        Self::new(error)
    }
}

impl From<CheckerPanicked> for CheckFailure {
    fn from(error: CheckerPanicked) -> Self {
        Self::new(error)
    }
}

impl From<String> for CheckFailure {
    fn from(message: String) -> Self {
        Self::msg(message)
    }
}

impl From<&str> for CheckFailure {
    fn from(message: &str) -> Self {
        Self::msg(message)
    }
}

/// Plain-message failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CheckMessage(pub String);

/// Error produced by an equality assertion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected '{actual}' to equal '{expected}'")]
pub struct AssertionFailure {
    /// Value that was observed.
    pub actual: String,
    /// Value that was expected.
    pub expected: String,
}

/// Asserts that `actual` equals `expected`.
///
/// # Errors
///
/// Returns an `AssertionFailure` describing both values on mismatch.
pub fn assert_equal(actual: &str, expected: &str) -> Result<(), AssertionFailure> {
    if actual == expected {
        Ok(())
    } else {
        Err(AssertionFailure {
            actual: actual.to_string(),
            expected: expected.to_string(),
        })
    }
}

/// Settlement did not finish within the configured timeout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("template checkers did not settle within {after_ms}ms ({pending} of {total} still pending)")]
pub struct SettleTimeout {
    /// Configured timeout in milliseconds.
    pub after_ms: u64,
    /// Checkers that had not signalled.
    pub pending: usize,
    /// Checkers taking part in the settlement.
    pub total: usize,
}

/// A checker dropped its signal without reporting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("checker '{checker}' dropped its signal without reporting a result")]
pub struct SignalDropped {
    /// Label of the checker.
    pub checker: String,
}

/// A checker panicked while it was being invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("checker '{checker}' panicked: {message}")]
pub struct CheckerPanicked {
    /// Label of the checker.
    pub checker: String,
    /// Panic payload, when it was a string.
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_assert_equal() {
        assert!(assert_equal("user.jade", "user.jade").is_ok());

        let err = assert_equal("user.jade", "incorrect").unwrap_err();
        assert_eq!(err.actual, "user.jade");
        assert_eq!(err.expected, "incorrect");
        assert_eq!(err.to_string(), "expected 'user.jade' to equal 'incorrect'");
    }

    #[test]
    fn test_failure_preserves_identity() {
        let failure = CheckFailure::msg("boom");
        let delivered = failure.clone();
        assert!(failure.ptr_eq(&delivered));
        assert!(!failure.ptr_eq(&CheckFailure::msg("boom")));
    }

    #[test]
    fn test_failure_downcast() {
        let original = assert_equal("a.jade", "b.jade").unwrap_err();
        let failure = CheckFailure::from(original.clone());

        assert!(failure.is::<AssertionFailure>());
        assert_eq!(failure.downcast_ref::<AssertionFailure>(), Some(&original));
        assert_eq!(failure.to_string(), original.to_string());
        assert!(failure.downcast_ref::<SignalDropped>().is_none());
    }
}
