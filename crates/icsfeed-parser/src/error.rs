//! Error types for document parsing.
//!
//! Parsing is best-effort: malformed fields degrade to empty values and never
//! show up here. The only reportable condition is a zone identifier that
//! neither the zone database nor the legacy table knows about.

use thiserror::Error;

/// A non-fatal problem found while parsing a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The zone identifier could not be resolved; UTC was used instead.
    #[error("unknown timezone {tzid:?}, falling back to UTC")]
    UnknownTimezone { tzid: String },
}

impl ParseError {
    /// Creates an unknown timezone error.
    pub fn unknown_timezone(tzid: impl Into<String>) -> Self {
        Self::UnknownTimezone { tzid: tzid.into() }
    }
}

/// A specialized Result type for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;
