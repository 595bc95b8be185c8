//! Logging setup for the icsfeed binaries.
//!
//! Logs always go to stderr because stdout carries the events themselves.
//! Two formats exist: compact text for a terminal and JSON lines for log
//! collectors. `RUST_LOG` overrides the level when no explicit filter is set.
//!
//! ```ignore
//! use icsfeed_core::tracing::{LogFormat, LogSettings, init_logging};
//!
//! init_logging(&LogSettings::quiet().with_format(LogFormat::Json))?;
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, Layer, prelude::*};

/// Crates whose targets the default filter enables.
const CRATE_TARGETS: [&str; 4] = [
    "icsfeed_core",
    "icsfeed_parser",
    "icsfeed_ingest",
    "icsfeed_cli",
];

/// Errors that can occur while setting up logging.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("failed to parse log filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),

    #[error("unknown log format {0:?} (expected \"text\" or \"json\")")]
    UnknownFormat(String),
}

/// How log records are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line human-readable records.
    #[default]
    Text,
    /// One JSON object per record.
    Json,
}

impl FromStr for LogFormat {
    type Err = TracingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(TracingError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Json => "json",
        })
    }
}

/// What to log and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Level enabled for the icsfeed crates.
    pub level: Level,
    pub format: LogFormat,
    /// Include source file and line in each record.
    pub show_location: bool,
    /// Explicit filter directive, replacing both `level` and `RUST_LOG`.
    pub filter: Option<String>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self::quiet()
    }
}

impl LogSettings {
    /// Warnings and errors only.
    #[must_use]
    pub fn quiet() -> Self {
        Self {
            level: Level::WARN,
            format: LogFormat::Text,
            show_location: false,
            filter: None,
        }
    }

    /// Everything down to debug, with source locations.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: Level::DEBUG,
            show_location: true,
            ..Self::quiet()
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// The directive enabling `level` for every icsfeed crate.
    pub fn directive(&self) -> String {
        CRATE_TARGETS
            .iter()
            .map(|target| format!("{target}={}", self.level))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn env_filter(&self) -> Result<EnvFilter, TracingError> {
        match self.filter {
            Some(ref filter) => Ok(EnvFilter::try_new(filter)?),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.directive()))),
        }
    }
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already set or the filter is invalid.
pub fn init_logging(settings: &LogSettings) -> Result<(), TracingError> {
    let filter = settings.env_filter()?;

    let layer = match settings.format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .compact()
            .without_time()
            .with_file(settings.show_location)
            .with_line_number(settings.show_location)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_file(settings.show_location)
            .with_line_number(settings.show_location)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        let quiet = LogSettings::default();
        assert_eq!(quiet.level, Level::WARN);
        assert_eq!(quiet.format, LogFormat::Text);
        assert!(!quiet.show_location);

        let debug = LogSettings::debug().with_format(LogFormat::Json);
        assert_eq!(debug.level, Level::DEBUG);
        assert_eq!(debug.format, LogFormat::Json);
        assert!(debug.show_location);
    }

    #[test]
    fn format_from_str() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" Text ".parse::<LogFormat>().unwrap(), LogFormat::Text);
        let err = "pretty".parse::<LogFormat>().unwrap_err();
        assert!(matches!(err, TracingError::UnknownFormat(ref f) if f == "pretty"));
        assert_eq!(LogFormat::Json.to_string(), "json");
    }

    #[test]
    fn format_deserializes_lowercase() {
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, LogFormat::Json);
        assert!(serde_json::from_str::<LogFormat>("\"Json\"").is_err());
    }

    #[test]
    fn directive_covers_all_crates() {
        let directive = LogSettings::debug().directive();
        assert_eq!(
            directive,
            "icsfeed_core=DEBUG,icsfeed_parser=DEBUG,icsfeed_ingest=DEBUG,icsfeed_cli=DEBUG"
        );
        assert!(EnvFilter::try_new(&directive).is_ok());
    }

    #[test]
    fn explicit_filter_is_validated() {
        let settings = LogSettings::quiet().with_filter("icsfeed_ingest=trace");
        assert!(settings.env_filter().is_ok());

        let broken = LogSettings::quiet().with_filter("icsfeed_ingest=loud");
        assert!(matches!(broken.env_filter(), Err(TracingError::EnvFilter(_))));
    }
}
