//! Configuration loading and environment variable handling

use crate::domains::StocktakeConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "STOCKTAKE".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<StocktakeConfig> {
        tracing::debug!(path = %path.as_ref().display(), "loading configuration file");
        let content = std::fs::read_to_string(path)?;
        let mut config: StocktakeConfig = serde_yaml::from_str(&content)?;

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<StocktakeConfig> {
        let mut config = StocktakeConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<StocktakeConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut StocktakeConfig) -> ConfigResult<()> {
        self.apply_api_overrides(&mut config.api)?;
        self.apply_auth_overrides(&mut config.auth)?;
        self.apply_console_overrides(&mut config.console)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    /// Apply inventory API config overrides
    fn apply_api_overrides(&self, config: &mut crate::domains::api::ApiConfig) -> ConfigResult<()> {
        if let Ok(base_url) = self.get_env_var("API_BASE_URL") {
            config.base_url = base_url;
        }

        if let Ok(timeout) = self.get_env_var("API_TIMEOUT") {
            let seconds: u64 = timeout
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid API_TIMEOUT: {}", e)))?;
            config.timeout = Duration::from_secs(seconds);
        }

        Ok(())
    }

    /// Apply identity provider config overrides
    fn apply_auth_overrides(&self, config: &mut crate::domains::auth::AuthConfig) -> ConfigResult<()> {
        if let Ok(url) = self.get_env_var("AUTH_URL") {
            config.url = url;
        }

        if let Ok(anon_key) = self.get_env_var("AUTH_ANON_KEY") {
            config.anon_key = Some(anon_key);
        }

        if let Ok(refresh_token) = self.get_env_var("AUTH_REFRESH_TOKEN") {
            config.refresh_token = Some(refresh_token);
        }

        if let Ok(timeout) = self.get_env_var("AUTH_STARTUP_TIMEOUT") {
            let seconds: u64 = timeout.parse().map_err(|e| {
                ConfigError::EnvError(format!("Invalid AUTH_STARTUP_TIMEOUT: {}", e))
            })?;
            config.startup_timeout = Duration::from_secs(seconds);
        }

        if let Ok(timeout) = self.get_env_var("AUTH_RESOLVE_TIMEOUT") {
            let seconds: u64 = timeout.parse().map_err(|e| {
                ConfigError::EnvError(format!("Invalid AUTH_RESOLVE_TIMEOUT: {}", e))
            })?;
            config.resolve_timeout = Duration::from_secs(seconds);
        }

        Ok(())
    }

    /// Apply console config overrides
    fn apply_console_overrides(
        &self,
        config: &mut crate::domains::console::ConsoleConfig,
    ) -> ConfigResult<()> {
        if let Ok(history_file) = self.get_env_var("CONSOLE_HISTORY_FILE") {
            config.history_file = Some(history_file.into());
        }

        if let Ok(history_size) = self.get_env_var("CONSOLE_HISTORY_SIZE") {
            config.history_size = history_size.parse().map_err(|e| {
                ConfigError::EnvError(format!("Invalid CONSOLE_HISTORY_SIZE: {}", e))
            })?;
        }

        Ok(())
    }

    /// Apply logging config overrides
    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = crate::domains::logging::LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = crate::domains::logging::LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::logging::LogLevel;
    use std::io::Write;

    #[test]
    fn loads_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "api:\n  base_url: https://inventory.example.com\n  timeout: 10\nauth:\n  url: https://auth.example.com\n  startup_timeout: 2\n"
        )
        .unwrap();

        let config = ConfigLoader::new().from_file(file.path()).unwrap();
        assert_eq!(config.api.base_url, "https://inventory.example.com");
        assert_eq!(config.api.timeout, Duration::from_secs(10));
        assert_eq!(config.auth.startup_timeout, Duration::from_secs(2));
        // Untouched domains keep their defaults
        assert_eq!(config.console.history_size, 1000);
    }

    #[test]
    fn invalid_file_fails_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "api:\n  base_url: ''\n").unwrap();
        assert!(ConfigLoader::new().from_file(file.path()).is_err());
    }

    #[test]
    fn env_overrides_take_precedence() {
        // Unique prefix keeps this test independent of the process environment.
        std::env::set_var("STK_LOADER_TEST_API_BASE_URL", "https://override.example.com");
        std::env::set_var("STK_LOADER_TEST_LOG_LEVEL", "debug");

        let config = ConfigLoader::with_prefix("STK_LOADER_TEST").from_env().unwrap();
        assert_eq!(config.api.base_url, "https://override.example.com");
        assert_eq!(config.logging.level, LogLevel::Debug);

        std::env::remove_var("STK_LOADER_TEST_API_BASE_URL");
        std::env::remove_var("STK_LOADER_TEST_LOG_LEVEL");
    }

    #[test]
    fn bad_env_value_is_reported() {
        std::env::set_var("STK_LOADER_BAD_API_TIMEOUT", "soon");
        let err = ConfigLoader::with_prefix("STK_LOADER_BAD").from_env().unwrap_err();
        assert!(err.to_string().contains("API_TIMEOUT"));
        std::env::remove_var("STK_LOADER_BAD_API_TIMEOUT");
    }
}
