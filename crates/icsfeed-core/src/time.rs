//! Compact iCalendar timestamp helpers.
//!
//! iCalendar writes timestamps in the "basic" ISO 8601 layout:
//! - `20250205T100000Z` (UTC)
//! - `20250205T100000` (local wall clock, interpreted against a TZID)
//! - `20250205` (date only, whole-day values)

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc, Weekday};

/// Layout of a compact local timestamp (`20250205T100000`).
pub const BASIC_DATE_TIME: &str = "%Y%m%dT%H%M%S";

/// Layout of a compact date-only value (`20250205`).
pub const BASIC_DATE: &str = "%Y%m%d";

/// Parses a compact timestamp as UTC.
///
/// A trailing `Z` is accepted but not required. Returns `None` for anything
/// that does not match [`BASIC_DATE_TIME`].
pub fn parse_basic_utc(s: &str) -> Option<DateTime<Utc>> {
    parse_basic_local(s).map(|naive| naive.and_utc())
}

/// Parses a compact timestamp without attaching a timezone.
pub fn parse_basic_local(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    let s = s.strip_suffix('Z').unwrap_or(s);
    NaiveDateTime::parse_from_str(s, BASIC_DATE_TIME).ok()
}

/// Parses a compact date-only value.
pub fn parse_basic_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), BASIC_DATE).ok()
}

/// Formats a UTC timestamp in the compact layout, with the `Z` suffix.
pub fn format_basic(dt: &DateTime<Utc>) -> String {
    format!("{}Z", dt.format(BASIC_DATE_TIME))
}

/// Returns true if the time-of-day is exactly 00:00:00.
pub fn is_midnight(dt: &DateTime<Utc>) -> bool {
    dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0
}

/// Returns the two-letter iCalendar code for a weekday (`MO`, `TU`, ...).
pub fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// Parses a two-letter iCalendar weekday code, case-insensitively.
pub fn parse_weekday_code(code: &str) -> Option<Weekday> {
    match code.trim().to_ascii_uppercase().as_str() {
        "MO" => Some(Weekday::Mon),
        "TU" => Some(Weekday::Tue),
        "WE" => Some(Weekday::Wed),
        "TH" => Some(Weekday::Thu),
        "FR" => Some(Weekday::Fri),
        "SA" => Some(Weekday::Sat),
        "SU" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Returns the date of the `n`-th `weekday` in the given month (1-based).
///
/// Returns `None` when the month has fewer than `n` such weekdays or the
/// year/month are out of range.
pub fn nth_weekday_of_month(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}
