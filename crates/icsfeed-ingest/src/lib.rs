//! Concurrent ingestion of iCalendar sources.
//!
//! - [`Session`] - Accepts locators, runs one worker per source, queues events
//! - [`Fetcher`] / [`DocumentFetcher`] - Document retrieval (local files, HTTP)
//! - [`IngestConfig`] - Explicit configuration passed to the session
//! - [`IngestError`] - Retrieval failures, zone fallbacks and usage errors
//!
//! # Architecture
//!
//! ```text
//!  submit(locator)
//!        │ in_flight += 1
//!        ▼
//! ┌──────────────┐  spawn   ┌──────────────┐   ┌──────────────┐
//! │  dispatcher  │─────────▶│ worker (N×)  │──▶│   Fetcher    │
//! └──────────────┘          └──────┬───────┘   └──────────────┘
//!                                  │ parse_document()
//!                    ┌─────────────┴─────────────┐
//!                    ▼                           ▼
//!            ┌──────────────┐         ┌─────────────────────┐
//!            │ event queue  │         │ calendars / errors  │
//!            │ next_event() │         │ in_flight -= 1      │
//!            └──────────────┘         └─────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use icsfeed_ingest::{IngestConfig, Session};
//!
//! let mut session = Session::new(IngestConfig::default())?;
//! session.submit("https://example.com/team.ics");
//! session.submit("/home/me/holidays.ics");
//!
//! while let Some(event) = session.next_event().await {
//!     println!("{} {}", event.start, event.summary);
//! }
//! let errors = session.errors()?;
//! ```

pub mod config;
pub mod error;
pub mod fetch;
pub mod session;

pub use config::IngestConfig;
pub use error::{IngestError, IngestResult};
pub use fetch::{BoxFuture, DocumentFetcher, Fetcher, is_remote, local_path};
pub use icsfeed_parser::ParseError;
pub use session::Session;
