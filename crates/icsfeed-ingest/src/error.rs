//! Ingestion error types.

use std::time::Duration;

use icsfeed_parser::ParseError;
use thiserror::Error;

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that can occur while ingesting sources.
///
/// Retrieval errors and zone fallbacks are collected per session and handed
/// out after drain, which is why the type is `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// Local file does not exist.
    #[error("Source not found: {locator}")]
    NotFound { locator: String },

    /// Local or transient file could not be read or written.
    #[error("Failed to read {locator}: {message}")]
    Read { locator: String, message: String },

    /// Remote request failed before a response was received.
    #[error("Failed to download {locator}: {message}")]
    Download { locator: String, message: String },

    /// Remote server answered with a non-success status.
    #[error("Unexpected HTTP status {status} for {locator}")]
    HttpStatus { locator: String, status: u16 },

    /// Retrieval did not finish within the configured timeout.
    #[error("Timed out after {after:?} fetching {locator}")]
    Timeout { locator: String, after: Duration },

    /// A zone identifier in the document fell back to UTC.
    #[error("{locator}: {source}")]
    Zone {
        locator: String,
        #[source]
        source: ParseError,
    },

    /// HTTP client could not be created.
    #[error("Failed to create HTTP client: {message}")]
    Client { message: String },

    /// Bulk accessor called while sources are still being processed.
    #[error("Session not drained: {in_flight} source(s) still in flight")]
    NotDrained { in_flight: usize },
}

impl IngestError {
    /// Creates a not found error.
    pub fn not_found(locator: impl Into<String>) -> Self {
        Self::NotFound {
            locator: locator.into(),
        }
    }

    /// Creates a read error.
    pub fn read(locator: impl Into<String>, message: impl ToString) -> Self {
        Self::Read {
            locator: locator.into(),
            message: message.to_string(),
        }
    }

    /// Creates a download error.
    pub fn download(locator: impl Into<String>, message: impl ToString) -> Self {
        Self::Download {
            locator: locator.into(),
            message: message.to_string(),
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(locator: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            locator: locator.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(locator: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            locator: locator.into(),
            after,
        }
    }

    /// Wraps a parser zone error with its source locator.
    pub fn zone(locator: impl Into<String>, source: ParseError) -> Self {
        Self::Zone {
            locator: locator.into(),
            source,
        }
    }

    /// Creates a client construction error.
    pub fn client(message: impl ToString) -> Self {
        Self::Client {
            message: message.to_string(),
        }
    }

    /// Returns true if the error made a source fail (as opposed to a zone
    /// fallback or a usage error).
    pub fn is_retrieval(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::Read { .. }
                | Self::Download { .. }
                | Self::HttpStatus { .. }
                | Self::Timeout { .. }
        )
    }

    /// Returns the source locator the error refers to, if any.
    pub fn locator(&self) -> Option<&str> {
        match self {
            Self::NotFound { locator }
            | Self::Read { locator, .. }
            | Self::Download { locator, .. }
            | Self::HttpStatus { locator, .. }
            | Self::Timeout { locator, .. }
            | Self::Zone { locator, .. } => Some(locator),
            Self::Client { .. } | Self::NotDrained { .. } => None,
        }
    }
}
