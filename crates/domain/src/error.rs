//! Domain error types

use thiserror::Error;

/// Errors raised synchronously by installation and registration misuse.
///
/// These are never deferred: the call that caused them returns them directly.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// No view engine name was supplied to `install`.
    #[error("you must supply a view engine name (e.g. \"jade\")")]
    MissingEngineName,

    /// The interceptor already holds a binding.
    #[error("interceptor is already installed on engine '{engine}'; it can only be installed on one app at a time")]
    AlreadyInstalled {
        /// Engine name of the active binding.
        engine: String,
    },

    /// A registration argument was neither a template name nor a checker.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A configuration value could not be parsed.
    #[error("invalid setting '{key}': {reason}")]
    InvalidSetting {
        /// Setting key (environment variable or field name).
        key: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigurationError {
    /// Creates an `InvalidArgument` error.
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }

    /// Creates an `InvalidSetting` error.
    pub fn invalid_setting(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

impl From<std::convert::Infallible> for ConfigurationError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

/// Result type alias for configuration operations.
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_installed_names_engine() {
        let err = ConfigurationError::AlreadyInstalled {
            engine: "jade".to_string(),
        };
        assert!(err.to_string().contains("'jade'"));
    }

    #[test]
    fn test_invalid_setting_message() {
        let err = ConfigurationError::invalid_setting("TOBOGGAN_SETTLE_TIMEOUT_MS", "not a number");
        assert_eq!(
            err.to_string(),
            "invalid setting 'TOBOGGAN_SETTLE_TIMEOUT_MS': not a number"
        );
    }
}
