//! Identity provider configuration

use crate::error::ConfigResult;
use crate::validation::{validate_base_url, validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the GoTrue-compatible identity API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Base URL of the identity API, e.g. `https://auth.example.com`
    #[serde(default = "default_auth_url")]
    pub url: String,

    /// Public anon key sent as the `apikey` header when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anon_key: Option<String>,

    /// Refresh token used to restore a session at startup. Usually injected
    /// through `STOCKTAKE_AUTH_REFRESH_TOKEN` rather than written to disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Upper bound on the startup session restore
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_startup_timeout"
    )]
    pub startup_timeout: Duration,

    /// Upper bound on each post-sign-in user-info/tenant resolution call
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_resolve_timeout"
    )]
    pub resolve_timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            url: default_auth_url(),
            anon_key: None,
            refresh_token: None,
            startup_timeout: default_startup_timeout(),
            resolve_timeout: default_resolve_timeout(),
        }
    }
}

impl Validatable for AuthConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_base_url(&self.url, "url", self.domain_name())?;
        validate_positive(
            self.startup_timeout.as_secs(),
            "startup_timeout",
            self.domain_name(),
        )?;
        validate_positive(
            self.resolve_timeout.as_secs(),
            "resolve_timeout",
            self.domain_name(),
        )?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "auth"
    }
}

// Default value functions
fn default_auth_url() -> String {
    "http://localhost:9999".to_string()
}

fn default_startup_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_resolve_timeout() -> Duration {
    Duration::from_secs(10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_config_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.startup_timeout, Duration::from_secs(5));
        assert_eq!(config.resolve_timeout, Duration::from_secs(10));
        assert!(config.anon_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = AuthConfig {
            startup_timeout: Duration::from_secs(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
