//! Settlement of one render cycle's checkers into a single verdict.
//!
//! Every checker is invoked before any result is awaited, so checkers that
//! defer their signal run interleaved. Results are then collected in
//! registration order; the verdict carries the error of the lowest-indexed
//! failing checker regardless of which one finished first.
//!
//! There is no timeout unless one is configured: a checker that keeps its
//! signal without ever using it stalls the cycle.

use std::time::Duration;

use tokio::sync::oneshot;
use toboggan_domain::{RenderOptions, SettleTimeout, SignalDropped, Verdict};
use tracing::{debug, warn};

use crate::checker::{CheckResult, Checker, Signal};

/// Runs checkers and aggregates their results.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    timeout: Option<Duration>,
}

/// A checker's state right after invocation.
enum Pending {
    /// Result known without waiting.
    Settled(CheckResult),
    /// Waiting for the checker's signal.
    Waiting {
        label: String,
        receiver: oneshot::Receiver<CheckResult>,
    },
}

impl Aggregator {
    /// Creates an aggregator that waits indefinitely.
    #[must_use]
    pub const fn new() -> Self {
        Self { timeout: None }
    }

    /// Sets an upper bound on settlement time.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the configured timeout.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Invokes every checker with `(path, options)` and waits for all of them.
    pub async fn settle(&self, checkers: Vec<Checker>, path: &str, options: &RenderOptions) -> Verdict {
        if checkers.is_empty() {
            return Verdict::Pass;
        }

        let total = checkers.len();
        let mut pending: Vec<Pending> = checkers
            .iter()
            .map(|checker| Self::invoke(checker, path, options))
            .collect();
        debug!(checkers = total, "waiting for template checkers");

        let mut results = Vec::with_capacity(total);
        let Some(limit) = self.timeout else {
            Self::collect(&mut pending, &mut results).await;
            return Verdict::from_ordered(results);
        };

        if tokio::time::timeout(limit, Self::collect(&mut pending, &mut results))
            .await
            .is_ok()
        {
            return Verdict::from_ordered(results);
        }

        // An earlier-registered failure still outranks the timeout.
        if let Some(failure) = results.into_iter().find_map(Result::err) {
            return Verdict::Fail(failure);
        }

        let still_waiting = pending
            .iter_mut()
            .map(|entry| match entry {
                Pending::Settled(_) => false,
                Pending::Waiting { receiver, .. } => {
                    matches!(receiver.try_recv(), Err(oneshot::error::TryRecvError::Empty))
                }
            })
            .filter(|waiting| *waiting)
            .count();
        let after_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
        warn!(after_ms, pending = still_waiting, total, "template checkers timed out");

        Verdict::Fail(
            SettleTimeout {
                after_ms,
                pending: still_waiting,
                total,
            }
            .into(),
        )
    }

    fn invoke(checker: &Checker, path: &str, options: &RenderOptions) -> Pending {
        let (signal, mut receiver) = Signal::channel();
        match checker.invoke(path, options, signal) {
            Ok(()) => Pending::Waiting {
                label: checker.label().to_string(),
                receiver,
            },
            // A synchronous error counts as the signal unless one was already sent.
            Err(failure) => Pending::Settled(receiver.try_recv().unwrap_or(Err(failure))),
        }
    }

    /// Appends results in registration order, resuming after any already collected.
    async fn collect(pending: &mut [Pending], results: &mut Vec<CheckResult>) {
        let start = results.len();
        for entry in pending.iter_mut().skip(start) {
            let result = match entry {
                Pending::Settled(result) => result.clone(),
                Pending::Waiting { label, receiver } => match receiver.await {
                    Ok(result) => result,
                    Err(_) => Err(SignalDropped {
                        checker: label.clone(),
                    }
                    .into()),
                },
            };
            results.push(result);
        }
    }
}
