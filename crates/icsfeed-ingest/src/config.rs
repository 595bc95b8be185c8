//! Ingestion configuration.

use std::path::PathBuf;
use std::time::Duration;

use icsfeed_parser::ExpandOptions;
use serde::{Deserialize, Deserializer};

/// Configuration for an ingestion [`Session`](crate::Session).
///
/// Loadable from TOML; missing keys keep their defaults. The fetch timeout is
/// written in whole seconds as `fetch_timeout_secs`, where 0 disables it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Remove downloaded documents once they have been read.
    pub delete_temp_files: bool,

    /// Directory downloaded documents are written to.
    pub temp_file_path: PathBuf,

    /// Whether recurring events are expanded at all.
    pub apply_recurrence_rules: bool,

    /// Cap on generated occurrences per recurring event.
    pub max_recurrence_occurrences: usize,

    /// Per-source limit on retrieval; a source that exceeds it fails.
    #[serde(rename = "fetch_timeout_secs", deserialize_with = "seconds")]
    pub fetch_timeout: Option<Duration>,

    /// `User-Agent` header for remote requests.
    pub user_agent: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            delete_temp_files: true,
            temp_file_path: PathBuf::from("tmp/"),
            apply_recurrence_rules: true,
            max_recurrence_occurrences: 1000,
            fetch_timeout: Some(Duration::from_secs(30)),
            user_agent: format!("icsfeed/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl IngestConfig {
    /// Creates a configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: keep or remove downloaded documents.
    pub fn with_delete_temp_files(mut self, delete: bool) -> Self {
        self.delete_temp_files = delete;
        self
    }

    /// Builder: set the download directory.
    pub fn with_temp_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.temp_file_path = path.into();
        self
    }

    /// Builder: enable or disable recurrence expansion.
    pub fn with_apply_recurrence_rules(mut self, apply: bool) -> Self {
        self.apply_recurrence_rules = apply;
        self
    }

    /// Builder: set the occurrence cap.
    pub fn with_max_recurrence_occurrences(mut self, max: usize) -> Self {
        self.max_recurrence_occurrences = max;
        self
    }

    /// Builder: set or clear the per-source timeout.
    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Builder: set the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Recurrence settings for the parser.
    pub fn expand_options(&self) -> ExpandOptions {
        ExpandOptions {
            apply: self.apply_recurrence_rules,
            max_occurrences: self.max_recurrence_occurrences,
        }
    }
}

fn seconds<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = Option::<u64>::deserialize(deserializer)?;
    Ok(secs.filter(|&s| s > 0).map(Duration::from_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = IngestConfig::default();
        assert!(config.delete_temp_files);
        assert_eq!(config.temp_file_path, PathBuf::from("tmp/"));
        assert!(config.apply_recurrence_rules);
        assert_eq!(config.max_recurrence_occurrences, 1000);
        assert_eq!(config.fetch_timeout, Some(Duration::from_secs(30)));
        assert!(config.user_agent.starts_with("icsfeed/"));
    }

    #[test]
    fn custom_config() {
        let config = IngestConfig::new()
            .with_delete_temp_files(false)
            .with_temp_file_path("/var/tmp/feeds")
            .with_apply_recurrence_rules(false)
            .with_max_recurrence_occurrences(10)
            .with_fetch_timeout(None)
            .with_user_agent("test-agent");

        assert!(!config.delete_temp_files);
        assert_eq!(config.temp_file_path, PathBuf::from("/var/tmp/feeds"));
        assert_eq!(config.fetch_timeout, None);
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(
            config.expand_options(),
            ExpandOptions {
                apply: false,
                max_occurrences: 10
            }
        );
    }
}
