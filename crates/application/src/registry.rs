//! Ordered registry of pending checkers.

use parking_lot::Mutex;

use crate::checker::Checker;

/// Checkers registered since the last drain, in registration order.
#[derive(Debug, Default)]
pub struct CheckerRegistry {
    checkers: Mutex<Vec<Checker>>,
}

impl CheckerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a checker.
    pub fn register(&self, checker: Checker) {
        self.checkers.lock().push(checker);
    }

    /// Removes and returns every registered checker, leaving the registry empty.
    ///
    /// Anything registered after this call belongs to the next drain.
    pub fn drain_all(&self) -> Vec<Checker> {
        std::mem::take(&mut *self.checkers.lock())
    }

    /// Returns the number of pending checkers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checkers.lock().len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checkers.lock().is_empty()
    }
}
