use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

/// Upper bound for every millisecond delay in `[session]`.
const MAX_DELAY_MS: u64 = 10 * 60 * 1000;
/// Upper bound for `session.shutdown_grace_secs`.
const MAX_GRACE_SECS: u64 = 5 * 60;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/promptpilot/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("promptpilot").join("config.toml")
    }

    /// Loads configuration from the default config file.
    ///
    /// A missing default file is not an error; built-in defaults are used.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }
        Self::load_from(&path)
    }

    /// Loads configuration from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The child command is set
    /// - The goodbye phrase is non-empty
    /// - Poll interval and read chunk are positive
    /// - Delays stay under ten minutes, the shutdown grace under five
    /// - At least one confirmation prompt exists
    /// - Every rule has a non-empty trigger
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.child.command.trim().is_empty() {
            return Err(invalid("child.command must not be empty"));
        }
        if self.session.goodbye_phrase.is_empty() {
            return Err(invalid("session.goodbye_phrase must not be empty"));
        }
        if self.session.poll_interval_ms == 0 {
            return Err(invalid("session.poll_interval_ms must be greater than 0"));
        }
        for (name, value) in [
            ("poll_interval_ms", self.session.poll_interval_ms),
            ("settle_delay_ms", self.session.settle_delay_ms),
            ("bootstrap_pause_ms", self.session.bootstrap_pause_ms),
            ("instruction_delay_ms", self.session.instruction_delay_ms),
        ] {
            if value > MAX_DELAY_MS {
                return Err(invalid(&format!(
                    "session.{name} must be at most {MAX_DELAY_MS}"
                )));
            }
        }
        if self.session.shutdown_grace_secs > MAX_GRACE_SECS {
            return Err(invalid(&format!(
                "session.shutdown_grace_secs must be at most {MAX_GRACE_SECS}"
            )));
        }
        if self.session.read_chunk == 0 {
            return Err(invalid("session.read_chunk must be greater than 0"));
        }
        if !self.confirm.prompts.iter().any(|p| !p.is_empty()) {
            return Err(invalid("confirm.prompts needs at least one non-empty prompt"));
        }
        for rule in &self.rules {
            if !rule.triggers.iter().any(|t| !t.is_empty()) {
                return Err(invalid(&format!(
                    "rule '{}' needs at least one non-empty trigger",
                    rule.name
                )));
            }
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError {
        message: message.to_string(),
    }
}
