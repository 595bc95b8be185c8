//! Timezone resolution.
//!
//! Two independent paths live here:
//!
//! - [`resolve_zone`] / [`local_to_utc`] turn a `TZID` plus a wall-clock
//!   timestamp into UTC using the IANA database shipped with `chrono-tz`,
//!   falling back to a table of legacy (Windows) zone names.
//! - [`rules::current_offset`] reads a document's own `VTIMEZONE` blocks and
//!   reports the offset in force *now* for a named zone.

pub mod rules;
mod windows;

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{ParseError, ParseResult};

pub use rules::{current_offset, current_offset_at};

/// Resolves a zone identifier to a zone definition.
///
/// Lookup order: the IANA database, then the legacy name table. Vendor
/// prefixes such as `/mozilla.org/20070129_1/Europe/Berlin` are peeled off
/// one segment at a time. An empty identifier means UTC.
///
/// # Errors
///
/// Returns [`ParseError::UnknownTimezone`] if no path knows the identifier.
pub fn resolve_zone(tzid: &str) -> ParseResult<Tz> {
    let tzid = tzid.trim().trim_matches('"');
    if tzid.is_empty() {
        return Ok(Tz::UTC);
    }

    let mut candidate = tzid;
    loop {
        if let Some(tz) = lookup(candidate) {
            return Ok(tz);
        }
        match candidate.split_once('/') {
            Some((_, rest)) if !rest.is_empty() => candidate = rest,
            _ => break,
        }
    }

    Err(ParseError::unknown_timezone(tzid))
}

fn lookup(name: &str) -> Option<Tz> {
    name.parse::<Tz>()
        .ok()
        .or_else(|| windows::to_iana(name).and_then(|iana| iana.parse().ok()))
}

/// Interprets a wall-clock timestamp in `tz` and converts it to UTC.
///
/// Ambiguous local times (the repeated hour when clocks go back) resolve to
/// the earlier instant. Times inside a spring-forward gap are shifted forward
/// by one hour.
pub fn local_to_utc(local: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => tz
            .from_local_datetime(&(local + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| local.and_utc()),
    }
}
