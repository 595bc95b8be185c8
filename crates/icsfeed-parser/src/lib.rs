//! iCalendar document parsing.
//!
//! This crate turns raw document text into populated [`Calendar`] values:
//!
//! - [`segment`](mod@segment) - Splits a document into event blocks, zone blocks and metadata
//! - [`fields`] - Per-field extractors for a single event block
//! - [`attendee`] - Attendee and organizer decoding
//! - [`timezone`] - Zone resolution and the offset-from-rules helper
//! - [`recurrence`] - Expansion of recurring events into occurrences
//! - [`parse_document`] - Everything above, for one document
//!
//! Parsing is best-effort and synchronous. Malformed fields turn into empty
//! values; the only reported problems are unresolvable zone identifiers.
//!
//! # Architecture
//!
//! ```text
//!            document text
//!                  │
//!                  ▼ segment()
//!   ┌──────────────┼───────────────┐
//!   ▼              ▼               ▼
//! meta text    VEVENT blocks   VTIMEZONE blocks
//!   │              │
//!   │              ▼ assemble_event()
//!   │       ┌─────────────┐   fields / attendee / timezone
//!   │       │   master    │
//!   │       └──────┬──────┘
//!   │              ▼ expand()
//!   │       ┌─────────────┐
//!   │       │ occurrences │
//!   │       └──────┬──────┘
//!   ▼              ▼
//! ┌────────────────────────┐
//! │        Calendar        │
//! └────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use icsfeed_parser::{ExpandOptions, parse_document};
//!
//! let parsed = parse_document(&text, "team.ics", 1, &ExpandOptions::default());
//! for event in &parsed.calendar.events {
//!     println!("{} {}", event.start, event.summary);
//! }
//! ```
//!
//! [`Calendar`]: icsfeed_core::Calendar

pub mod assemble;
pub mod attendee;
pub mod error;
pub mod fields;
pub mod recurrence;
pub mod segment;
pub mod timezone;

pub use assemble::{Parsed, assemble_event, parse_document};
pub use error::{ParseError, ParseResult};
pub use recurrence::{ExpandOptions, Frequency, RecurrenceRule, expand};
pub use segment::{Segments, segment};
pub use timezone::{current_offset, current_offset_at, local_to_utc, resolve_zone};
