//! Interactive console configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the interactive console
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// History file path; defaults to `~/.stocktake_history` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,

    /// Maximum number of history entries kept
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Whether output uses ANSI colors
    #[serde(default = "crate::domains::utils::default_true")]
    pub color: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            history_file: None,
            history_size: default_history_size(),
            color: true,
        }
    }
}

impl Validatable for ConsoleConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.history_size as u64, "history_size", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "console"
    }
}

// Default value functions
fn default_history_size() -> usize {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_config_defaults() {
        let config = ConsoleConfig::default();
        assert_eq!(config.history_size, 1000);
        assert!(config.color);
        assert!(config.history_file.is_none());
        assert!(config.validate().is_ok());
    }
}
