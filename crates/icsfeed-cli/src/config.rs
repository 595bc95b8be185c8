//! CLI configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/icsfeed/config.toml` by default:
//!
//! ```toml
//! debug = false
//! json = false
//! log_format = "text"
//!
//! [ingest]
//! delete_temp_files = true
//! temp_file_path = "/var/tmp/icsfeed"
//! apply_recurrence_rules = true
//! max_recurrence_occurrences = 500
//! fetch_timeout_secs = 30
//! ```

use std::path::{Path, PathBuf};

use icsfeed_core::LogFormat;
use icsfeed_ingest::IngestConfig;
use serde::Deserialize;

use crate::error::{CliError, CliResult};

/// Configuration for the icsfeed CLI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Debug logging.
    pub debug: bool,

    /// Print events as JSON lines.
    pub json: bool,

    /// Log record format on stderr.
    pub log_format: LogFormat,

    /// Session settings.
    pub ingest: IngestConfig,
}

impl CliConfig {
    /// Loads the configuration from the default path, or defaults if the file
    /// does not exist.
    pub fn load() -> CliResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| CliError::config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("icsfeed")
    }
}
