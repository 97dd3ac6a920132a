//! Suite configuration
//!
//! A [`SuiteConfig`] is an explicit value handed to the orchestrator; nothing
//! is read from process-wide state here. Loading it from files and the
//! environment is the infrastructure layer's job.

use std::collections::BTreeMap;

use bookcheck_domain::Credentials;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::scenarios::Scenario;

/// Base URL of the public booking service.
pub const DEFAULT_BASE_URL: &str = "https://restful-booker.herokuapp.com";

/// Default per-request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Errors raised while loading or validating a [`SuiteConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// A value is present but unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Everything a suite run needs to know about its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Root URL of the booking service, without the `/booking` path.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_ms: u64,
    /// Credentials sent with mutating requests.
    pub credentials: Credentials,
    /// Headers sent with every request.
    pub default_headers: BTreeMap<String, String>,
    /// Run scenarios concurrently.
    pub parallel: bool,
    /// Scenarios to run, in order.
    pub scenarios: Vec<Scenario>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            credentials: Credentials::default(),
            default_headers: BTreeMap::from([(
                "Accept".to_string(),
                "application/json".to_string(),
            )]),
            parallel: false,
            scenarios: Scenario::all().to_vec(),
        }
    }
}

impl SuiteConfig {
    /// Creates the default configuration pointed at `base_url`.
    #[must_use]
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Checks that the configuration can drive a run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the base URL is not an absolute
    /// http(s) URL, the timeout is zero, or the username is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::Invalid(format!("base_url {:?}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "base_url must use http or https, got {}",
                url.scheme()
            )));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.credentials.username.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "credentials.username must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = SuiteConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_ms, 30_000);
        assert_eq!(config.credentials, Credentials::new("admin", "password123"));
        assert_eq!(
            config.default_headers.get("Accept").map(String::as_str),
            Some("application/json")
        );
        assert!(!config.parallel);
        assert_eq!(config.scenarios.len(), 6);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config: SuiteConfig =
            serde_json::from_str(r#"{"parallel": true, "scenarios": ["delete_booking"]}"#).unwrap();
        assert!(config.parallel);
        assert_eq!(config.scenarios, vec![Scenario::DeleteBooking]);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases = [
            SuiteConfig::for_base_url("not a url"),
            SuiteConfig::for_base_url("ftp://example.com"),
            SuiteConfig {
                timeout_ms: 0,
                ..SuiteConfig::default()
            },
            SuiteConfig {
                credentials: Credentials::new(" ", "secret"),
                ..SuiteConfig::default()
            },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid(_))),
                "accepted {config:?}"
            );
        }
    }
}
