//! Response expectations checked by the test driver.

use regex::Regex;
use thiserror::Error;

use super::TestResponse;

/// The driver's own failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DriverFailure {
    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// Unexpected status code.
    #[error("expected status {expected}, got {actual}")]
    Status {
        /// Description of the expected status.
        expected: String,
        /// Actual status code.
        actual: u16,
    },

    /// A header was absent.
    #[error("header '{0}' not found")]
    MissingHeader(String),

    /// A header had the wrong value.
    #[error("header '{name}' value mismatch: expected '{expected}', got '{actual}'")]
    HeaderMismatch {
        /// Header name.
        name: String,
        /// Expected value.
        expected: String,
        /// Actual value.
        actual: String,
    },

    /// The body lacked the expected text.
    #[error("body does not contain '{0}'")]
    BodyMissing(String),

    /// The body did not match the pattern.
    #[error("body does not match pattern '{0}'")]
    BodyMismatch(String),

    /// A body pattern was not a valid regex.
    #[error("invalid regex pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The pattern as given.
        pattern: String,
        /// Regex compiler message.
        message: String,
    },
}

/// Expected status code value or range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusExpectation {
    /// Exact status code.
    Exact(u16),
    /// Inclusive range of status codes.
    Range {
        /// Minimum status code.
        min: u16,
        /// Maximum status code.
        max: u16,
    },
}

impl StatusExpectation {
    /// Any 2xx status.
    #[must_use]
    pub const fn success() -> Self {
        Self::Range { min: 200, max: 299 }
    }

    /// Returns true if `status` satisfies the expectation.
    #[must_use]
    pub const fn matches(&self, status: u16) -> bool {
        match self {
            Self::Exact(expected) => status == *expected,
            Self::Range { min, max } => status >= *min && status <= *max,
        }
    }

    /// Human-readable form used in failure messages.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Exact(code) => code.to_string(),
            Self::Range { min, max } => format!("in {min}-{max}"),
        }
    }
}

impl From<u16> for StatusExpectation {
    fn from(code: u16) -> Self {
        Self::Exact(code)
    }
}

/// One assertion on a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseExpectation {
    /// Check the status code.
    Status(StatusExpectation),
    /// Check that a header exists, optionally with an exact value.
    Header {
        /// Header name (case-insensitive).
        name: String,
        /// Expected value.
        value: Option<String>,
    },
    /// Check that the body contains text.
    BodyContains {
        /// Text to search for.
        text: String,
        /// Case-insensitive search.
        ignore_case: bool,
    },
    /// Check that the body matches a regex.
    BodyMatches {
        /// Regex pattern.
        pattern: String,
    },
}

impl ResponseExpectation {
    /// Checks `response` against this expectation.
    ///
    /// # Errors
    ///
    /// Returns the `DriverFailure` describing the mismatch.
    pub fn check(&self, response: &TestResponse) -> Result<(), DriverFailure> {
        match self {
            Self::Status(expected) => {
                let actual = response.status();
                if expected.matches(actual) {
                    Ok(())
                } else {
                    Err(DriverFailure::Status {
                        expected: expected.description(),
                        actual,
                    })
                }
            }
            Self::Header { name, value } => {
                let actual = response
                    .header(name)
                    .ok_or_else(|| DriverFailure::MissingHeader(name.clone()))?;
                match value {
                    Some(expected) if expected != actual => Err(DriverFailure::HeaderMismatch {
                        name: name.clone(),
                        expected: expected.clone(),
                        actual: actual.to_string(),
                    }),
                    _ => Ok(()),
                }
            }
            Self::BodyContains { text, ignore_case } => {
                let body = response.text();
                let contains = if *ignore_case {
                    body.to_lowercase().contains(&text.to_lowercase())
                } else {
                    body.contains(text.as_str())
                };
                if contains {
                    Ok(())
                } else {
                    Err(DriverFailure::BodyMissing(text.clone()))
                }
            }
            Self::BodyMatches { pattern } => {
                let regex = Regex::new(pattern).map_err(|e| DriverFailure::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
                if regex.is_match(response.text()) {
                    Ok(())
                } else {
                    Err(DriverFailure::BodyMismatch(pattern.clone()))
                }
            }
        }
    }
}
