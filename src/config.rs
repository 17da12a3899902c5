//! Configuration management for Taskflow
//!
//! Settings that belong to the machine rather than to the task data (remote
//! sync credentials, logging) live in a TOML file. User preferences such as
//! calendar colors travel inside the snapshot instead.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `sync.token`.
pub const SYNC_TOKEN_ENV: &str = "TASKFLOW_SYNC_TOKEN";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// Remote backup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Base URL of the document store; the document id is appended to it
    pub endpoint: String,
    /// Access token sent with every request
    pub token: Option<String>,
    /// Identifier of the backup document
    pub document_id: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable logging to the data directory
    pub enabled: bool,
    /// One of: error, warn, info, debug, trace
    pub level: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.jsonbin.io/v3/b".to_string(),
            token: None,
            document_id: None,
            timeout_secs: 15,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Result<log::LevelFilter> {
        self.level
            .parse::<log::LevelFilter>()
            .map_err(|_| anyhow::anyhow!("Invalid logging level '{}'", self.level))
    }
}

impl Config {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };
        if let Ok(token) = std::env::var(SYNC_TOKEN_ENV) {
            if !token.trim().is_empty() {
                config.sync.token = Some(token);
            }
        }
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in order of precedence
    fn find_config_file() -> Option<PathBuf> {
        let current_dir_config = PathBuf::from("taskflow.toml");
        if current_dir_config.exists() {
            return Some(current_dir_config);
        }

        Self::default_config_path().ok().filter(|p| p.exists())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.logging.level_filter()?;

        let endpoint = self.sync.endpoint.trim();
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            anyhow::bail!("sync.endpoint must be an http(s) URL, got '{}'", self.sync.endpoint);
        }

        if self.sync.timeout_secs == 0 || self.sync.timeout_secs > 300 {
            anyhow::bail!("sync.timeout_secs must be between 1 and 300, got {}", self.sync.timeout_secs);
        }

        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
            .map(|dir| dir.join("taskflow").join("config.toml"))
    }
}
