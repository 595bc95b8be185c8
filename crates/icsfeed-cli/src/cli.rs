//! Command-line interface definition.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use icsfeed_core::{LogFormat, LogSettings};
use icsfeed_ingest::IngestConfig;

use crate::config::CliConfig;

/// icsfeed - Load iCalendar feeds and print their events
#[derive(Debug, Parser)]
#[command(name = "icsfeed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "ICSFEED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Output events as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Log format on stderr: text or json
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Do not expand recurring events
    #[arg(long)]
    pub no_recurrence: bool,

    /// Maximum generated occurrences per recurring event
    #[arg(long)]
    pub max_occurrences: Option<usize>,

    /// Keep downloaded documents instead of deleting them
    #[arg(long)]
    pub keep_temp_files: bool,

    /// Directory for downloaded documents
    #[arg(long)]
    pub temp_dir: Option<PathBuf>,

    /// Per-source timeout in seconds (0 disables it)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Calendar sources: file paths or http(s) URLs
    #[arg(required = true, value_name = "SOURCES")]
    pub sources: Vec<String>,
}

impl Cli {
    /// Picks logging settings from flags, falling back to the file.
    pub fn log_settings(&self, file: &CliConfig) -> LogSettings {
        let settings = if self.debug || file.debug {
            LogSettings::debug()
        } else {
            LogSettings::quiet()
        };
        settings.with_format(self.log_format.unwrap_or(file.log_format))
    }

    /// Applies command-line overrides on top of file configuration.
    pub fn ingest_config(&self, base: IngestConfig) -> IngestConfig {
        let mut config = base;
        if self.no_recurrence {
            config = config.with_apply_recurrence_rules(false);
        }
        if let Some(max) = self.max_occurrences {
            config = config.with_max_recurrence_occurrences(max);
        }
        if self.keep_temp_files {
            config = config.with_delete_temp_files(false);
        }
        if let Some(ref dir) = self.temp_dir {
            config = config.with_temp_file_path(dir);
        }
        if let Some(secs) = self.timeout {
            config = config.with_fetch_timeout((secs > 0).then(|| Duration::from_secs(secs)));
        }
        config
    }
}
