//! Core types: calendars, events, attendees, compact timestamps, tracing

pub mod calendar;
pub mod event;
pub mod time;
pub mod tracing;

pub use calendar::Calendar;
pub use event::{Attendee, Event, Geo};
pub use time::{format_basic, parse_basic_date, parse_basic_utc, weekday_code};
pub use tracing::{LogFormat, LogSettings, TracingError, init_logging};
