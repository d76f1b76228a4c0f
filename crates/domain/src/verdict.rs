//! Aggregated outcome of one render cycle.

use crate::failure::CheckFailure;

/// Outcome of a settlement.
#[derive(Debug, Clone, Default)]
pub enum Verdict {
    /// Every checker signalled without error.
    #[default]
    Pass,
    /// At least one checker failed; carries the error of the first one in
    /// registration order.
    Fail(CheckFailure),
}

impl Verdict {
    /// Builds a verdict from per-checker results listed in registration order.
    ///
    /// The first error in the list wins, whatever order the checkers actually
    /// finished in.
    pub fn from_ordered<I>(results: I) -> Self
    where
        I: IntoIterator<Item = Result<(), CheckFailure>>,
    {
        results
            .into_iter()
            .find_map(Result::err)
            .map_or(Self::Pass, Self::Fail)
    }

    /// Returns true if the verdict is a pass.
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Returns the failure, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&CheckFailure> {
        match self {
            Self::Pass => None,
            Self::Fail(failure) => Some(failure),
        }
    }

    /// Converts into the failure, if any.
    #[must_use]
    pub fn into_failure(self) -> Option<CheckFailure> {
        match self {
            Self::Pass => None,
            Self::Fail(failure) => Some(failure),
        }
    }
}

impl From<Option<CheckFailure>> for Verdict {
    fn from(failure: Option<CheckFailure>) -> Self {
        failure.map_or(Self::Pass, Self::Fail)
    }
}
