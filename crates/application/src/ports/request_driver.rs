//! Request driver port

use std::future::Future;

/// Port for the test driver that issues a request and reports its outcome.
///
/// This trait abstracts the request/response test client so the completion
/// bridge can merge template verdicts into any driver's result.
pub trait RequestDriver: Send {
    /// Response handed to the test on success.
    type Response: Send;

    /// The driver's own assertion failure.
    type Failure: std::error::Error + Send + Sync + 'static;

    /// Issues the request and resolves once the full cycle has completed.
    ///
    /// # Errors
    ///
    /// Returns the driver's failure if the request could not be made or one
    /// of its response expectations did not hold.
    fn end(self) -> impl Future<Output = Result<Self::Response, Self::Failure>> + Send;
}
