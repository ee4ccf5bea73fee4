//! Runtime settings for the assistant.
//!
//! Settings come from an optional JSON file and are then overridden by
//! environment variables (`OPENAI_API_KEY`, `OPENAI_API_BASE`,
//! `RAGENT_BIND_ADDR`, `RAGENT_CONVERSATION_DIR`).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration parsing and loading errors.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid setting '{key}': {message}")]
    Invalid { key: &'static str, message: String },
}

impl ConfigError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

/// Backoff settings for upstream calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self { max_attempts: 3, base_delay_secs: 2 }
    }
}

impl RetrySettings {
    pub fn base_delay(&self) -> Duration {
        Duration::from_secs(self.base_delay_secs)
    }
}

/// All settings the server needs at start-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Upstream credential; may be supplied later at runtime.
    pub openai_api_key: Option<String>,
    pub openai_api_base: String,
    pub geocoding_base_url: String,
    pub forecast_base_url: String,
    /// Client identifier sent to the geocoding service.
    pub user_agent: String,
    pub retry: RetrySettings,
    /// Number of concurrent document uploads.
    pub upload_concurrency: usize,
    pub bind_addr: String,
    /// Directory conversation files are saved to and loaded from.
    pub conversation_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_api_base: "https://api.openai.com/v1".to_string(),
            geocoding_base_url: "https://nominatim.openstreetmap.org".to_string(),
            forecast_base_url: "https://api.open-meteo.com".to_string(),
            user_agent: "RAGAgentic/1.0".to_string(),
            retry: RetrySettings::default(),
            upload_concurrency: 5,
            bind_addr: "0.0.0.0:8000".to_string(),
            conversation_dir: PathBuf::from("data/conversations"),
        }
    }
}

impl Settings {
    /// Loads settings from an optional JSON file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    /// Reads settings from a JSON file; missing keys take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::io(path.display().to_string(), e))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Applies overrides from a key lookup (the process environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|k| !k.is_empty()) {
            self.openai_api_key = Some(key);
        }
        if let Some(base) = lookup("OPENAI_API_BASE") {
            self.openai_api_base = base;
        }
        if let Some(addr) = lookup("RAGENT_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(dir) = lookup("RAGENT_CONVERSATION_DIR") {
            self.conversation_dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "retry.max_attempts",
                message: "must be at least 1".into(),
            });
        }
        if self.upload_concurrency == 0 {
            return Err(ConfigError::Invalid {
                key: "upload_concurrency",
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}
