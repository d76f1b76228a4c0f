//! Interceptor configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use toboggan_domain::{ConfigurationError, ConfigurationResult};

/// Environment variable holding the settle timeout in milliseconds.
pub const SETTLE_TIMEOUT_ENV: &str = "TOBOGGAN_SETTLE_TIMEOUT_MS";

/// Settings for a `Toboggan` interceptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptorConfig {
    /// Upper bound on how long a render cycle waits for its checkers.
    ///
    /// `None` (the default) waits indefinitely.
    pub settle_timeout_ms: Option<u64>,
}

impl InterceptorConfig {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSetting` if a variable is present but malformed.
    pub fn from_env() -> ConfigurationResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSetting` if a value is present but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigurationResult<Self> {
        let settle_timeout_ms = match lookup(SETTLE_TIMEOUT_ENV) {
            None => None,
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(parse_timeout(SETTLE_TIMEOUT_ENV, raw.trim())?),
        };
        Ok(Self { settle_timeout_ms })
    }

    /// Sets the settle timeout (builder pattern).
    #[must_use]
    pub const fn with_settle_timeout_ms(mut self, ms: u64) -> Self {
        self.settle_timeout_ms = Some(ms);
        self
    }

    /// Returns the settle timeout as a `Duration`.
    #[must_use]
    pub fn settle_timeout(&self) -> Option<Duration> {
        self.settle_timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

fn parse_timeout(key: &str, raw: &str) -> ConfigurationResult<u64> {
    match raw.parse::<u64>() {
        Ok(0) => Err(ConfigurationError::invalid_setting(key, "must be greater than zero")),
        Ok(ms) => Ok(ms),
        Err(e) => Err(ConfigurationError::invalid_setting(key, e.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lookup(value: Option<&'static str>) -> impl Fn(&str) -> Option<String> {
        move |key| {
            assert_eq!(key, SETTLE_TIMEOUT_ENV);
            value.map(ToString::to_string)
        }
    }

    #[test]
    fn test_default_has_no_timeout() {
        let config = InterceptorConfig::default();
        assert_eq!(config.settle_timeout(), None);
    }

    #[test]
    fn test_from_lookup() {
        let config = InterceptorConfig::from_lookup(lookup(Some("250"))).unwrap();
        assert_eq!(config.settle_timeout(), Some(Duration::from_millis(250)));

        let config = InterceptorConfig::from_lookup(lookup(None)).unwrap();
        assert_eq!(config, InterceptorConfig::default());

        let config = InterceptorConfig::from_lookup(lookup(Some("  "))).unwrap();
        assert_eq!(config.settle_timeout_ms, None);
    }

    #[test]
    fn test_rejects_malformed_values() {
        let err = InterceptorConfig::from_lookup(lookup(Some("soon"))).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidSetting { ref key, .. } if key == SETTLE_TIMEOUT_ENV));

        let err = InterceptorConfig::from_lookup(lookup(Some("0"))).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: InterceptorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.settle_timeout_ms, None);

        let config: InterceptorConfig =
            serde_json::from_str(r#"{"settle_timeout_ms": 1000}"#).unwrap();
        assert_eq!(config, InterceptorConfig::default().with_settle_timeout_ms(1000));
    }
}
