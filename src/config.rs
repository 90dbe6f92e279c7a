//! Engine configuration
//!
//! Loaded from a JSON file; every field has a default so `{}` is a valid
//! configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::{FilterLimits, DEFAULT_PAGE_LENGTH, MAX_PAGE_LENGTH};
use crate::observability::{log_event, Event};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Records engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Page length when the caller sends none (default: 10)
    #[serde(default = "default_page_length")]
    pub default_page_length: u64,

    /// Largest page length a caller may ask for (default: 1000)
    #[serde(default = "default_max_page_length")]
    pub max_page_length: u64,

    /// Serialize reverts per file within this process (default: true)
    #[serde(default = "default_serialize_reverts")]
    pub serialize_reverts: bool,

    /// Scheduler task that computes a file's next step
    #[serde(default = "default_next_step_task")]
    pub next_step_task: String,
}

fn default_page_length() -> u64 {
    DEFAULT_PAGE_LENGTH
}

fn default_max_page_length() -> u64 {
    MAX_PAGE_LENGTH
}

fn default_serialize_reverts() -> bool {
    true
}

fn default_next_step_task() -> String {
    "rivoli.status_scheduler.next_step_id".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_page_length: default_page_length(),
            max_page_length: default_max_page_length(),
            serialize_reverts: default_serialize_reverts(),
            next_step_task: default_next_step_task(),
        }
    }
}

impl EngineConfig {
    /// Load and validate configuration from a file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_json(&content)?;

        log_event(
            Event::ConfigLoaded,
            &[
                ("path", &path.display().to_string()),
                ("max_page_length", &config.max_page_length.to_string()),
                ("serialize_reverts", &config.serialize_reverts.to_string()),
            ],
        );

        Ok(config)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: EngineConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.default_page_length == 0 {
            return Err(ConfigError::Invalid("default_page_length must be > 0".into()));
        }

        if self.max_page_length == 0 {
            return Err(ConfigError::Invalid("max_page_length must be > 0".into()));
        }

        if self.default_page_length > self.max_page_length {
            return Err(ConfigError::Invalid(format!(
                "default_page_length ({}) exceeds max_page_length ({})",
                self.default_page_length, self.max_page_length
            )));
        }

        if self.next_step_task.trim().is_empty() {
            return Err(ConfigError::Invalid("next_step_task must not be empty".into()));
        }

        Ok(())
    }

    /// Paging limits handed to `FilterSpec::from_params`
    pub fn filter_limits(&self) -> FilterLimits {
        FilterLimits {
            default_page_length: self.default_page_length,
            max_page_length: self.max_page_length,
        }
    }
}
