//! Serializable logger configuration

use super::error::{LoggerError, Result};
use super::handoff::DEFAULT_QUEUE_CAPACITY;
use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

/// Settings for [`Logger::from_config`](crate::Logger::from_config).
///
/// Only `directory_prefix` is required:
///
/// ```
/// use hourly_logger::prelude::*;
///
/// let config = LoggerConfig::from_json(r#"{ "directory_prefix": "./log", "level": "warn" }"#).unwrap();
/// assert_eq!(config.level, LogLevel::Warn);
/// assert_eq!(config.queue_capacity, 100_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    pub directory_prefix: PathBuf,
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl LoggerConfig {
    pub fn new(directory_prefix: impl Into<PathBuf>) -> Self {
        Self {
            directory_prefix: directory_prefix.into(),
            level: LogLevel::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading logger config",
                format!("Failed to read '{}'", path.display()),
                e,
            )
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values no logger can be built from.
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(LoggerError::config(
                "LoggerConfig",
                "queue_capacity must be at least 1",
            ));
        }
        if self.directory_prefix.as_os_str().is_empty() {
            return Err(LoggerError::config(
                "LoggerConfig",
                "directory_prefix must not be empty",
            ));
        }
        Ok(())
    }
}
