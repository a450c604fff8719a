//! Domain-specific configuration modules

pub mod api;
pub mod auth;
pub mod console;
pub mod logging;
pub mod utils;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main Stocktake configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StocktakeConfig {
    /// Inventory API configuration
    #[serde(default)]
    pub api: api::ApiConfig,

    /// Identity provider configuration
    #[serde(default)]
    pub auth: auth::AuthConfig,

    /// Interactive console configuration
    #[serde(default)]
    pub console: console::ConsoleConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl StocktakeConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.api.validate()?;
        self.auth.validate()?;
        self.console.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = StocktakeConfig::default();
        serde_yaml::to_string(&config).unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(StocktakeConfig::default().validate_all().is_ok());
    }

    #[test]
    fn sample_round_trips() {
        let sample = StocktakeConfig::generate_sample();
        let parsed: StocktakeConfig = serde_yaml::from_str(&sample).unwrap();
        assert!(parsed.validate_all().is_ok());
    }
}
