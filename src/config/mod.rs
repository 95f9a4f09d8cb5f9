//! Process configuration.
//!
//! A single json5 file with one section per concern, loaded from the user
//! config dir (or an explicit `--config` path), with the bot token
//! overridable from the environment. Missing file means defaults; a missing
//! token is caught by validation, not by loading.

use crate::logging::LoggingConfig;
use crate::polls::PollSettings;
use crate::telegram::TelegramConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// One failed validation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Config path of the offending value, e.g. `polls.quorum_mute`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub polls: PollSettings,
}

impl Config {
    /// Validate every section, collecting all failures.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Err(message) = self.telegram.validate() {
            errors.push(ValidationError {
                path: "telegram".to_string(),
                message,
            });
        }
        if let Err(message) = self.polls.validate() {
            errors.push(ValidationError {
                path: "polls".to_string(),
                message,
            });
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Default config file location: `<config dir>/votewarden/config.json5`.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("votewarden").join("config.json5"))
        .unwrap_or_else(|| PathBuf::from("votewarden.json5"))
}

/// Load configuration from `path` (or the default location), then apply
/// environment overrides. A missing file yields the defaults.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_path);
    let mut config = if path.exists() {
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        json5::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?
    } else {
        Config::default()
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

/// The bot token may come from the environment instead of the file.
fn apply_env_overrides(config: &mut Config) {
    for key in ["VOTEWARDEN_BOT_TOKEN", "BOT_TOKEN"] {
        if let Ok(token) = std::env::var(key) {
            if !token.trim().is_empty() {
                config.telegram.bot_token = token;
                return;
            }
        }
    }
}
