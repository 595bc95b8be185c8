//! CLI error types.

use icsfeed_core::TracingError;
use icsfeed_ingest::IngestError;
use thiserror::Error;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that stop the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Session setup or usage error.
    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// Event could not be serialized.
    #[error("output error: {0}")]
    Json(#[from] serde_json::Error),

    /// Logging could not be initialized.
    #[error("logging setup failed: {0}")]
    Tracing(#[from] TracingError),
}

impl CliError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
