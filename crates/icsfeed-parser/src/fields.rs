//! Field extraction from a single `VEVENT` block (or calendar metadata text).
//!
//! Every extractor looks for the first line whose key matches, optionally
//! followed by parameters (`SUMMARY;LANGUAGE=de:...`), and returns the value
//! with the terminator stripped. Nothing here fails: a missing or malformed
//! field yields the empty value of its type.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use icsfeed_core::time::{parse_basic_date, parse_basic_local};
use icsfeed_core::Geo;
use regex::Regex;

use crate::error::ParseError;
use crate::timezone;

/// Matches a parameter list such as `;LANGUAGE=en;ALTREP="http://x"`.
const PARAMS: &str = r#"(?:;(?:"[^"]*"|[^";:\r\n])*)*"#;

/// Builds the pattern for a property.
///
/// Group 1 holds the parameter list, group 2 the value. Folded properties also
/// capture their indented continuation lines in the value.
pub(crate) fn property_regex(name: &str, folded: bool) -> Regex {
    let tail = if folded { r"(?:\r?\n[ \t].*)*" } else { "" };
    Regex::new(&format!(r"(?m)^{name}({PARAMS}):(.*{tail})"))
        .expect("property regex should be valid")
}

/// Removes line folding (a line break followed by a space or tab).
pub(crate) fn unfold(value: &str) -> String {
    value
        .replace("\r\n ", "")
        .replace("\r\n\t", "")
        .replace("\n ", "")
        .replace("\n\t", "")
}

fn value_of(pattern: &Regex, text: &str) -> String {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(2))
        .map(|m| unfold(m.as_str()).trim().to_string())
        .unwrap_or_default()
}

macro_rules! property {
    ($static:ident, $name:literal) => {
        static $static: LazyLock<Regex> = LazyLock::new(|| property_regex($name, false));
    };
    ($static:ident, $name:literal, folded) => {
        static $static: LazyLock<Regex> = LazyLock::new(|| property_regex($name, true));
    };
}

property!(SUMMARY, "SUMMARY", folded);
property!(DESCRIPTION, "DESCRIPTION", folded);
property!(LOCATION, "LOCATION", folded);
property!(STATUS, "STATUS");
property!(UID, "UID");
property!(CLASS, "CLASS");
property!(SEQUENCE, "SEQUENCE");
property!(CREATED, "CREATED");
property!(LAST_MODIFIED, "LAST-MODIFIED");
property!(RRULE, "RRULE");
property!(GEO, "GEO");
property!(DURATION, "DURATION");
property!(DTSTART, "DTSTART");
property!(DTEND, "DTEND");

property!(CALNAME, "X-WR-CALNAME");
property!(CALDESC, "X-WR-CALDESC");
property!(VERSION, "VERSION");
property!(CALTZ, "X-WR-TIMEZONE");

static TZID_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#";TZID=("[^"]*"|[^";:]*)"#).expect("TZID regex should be valid"));
static VALUE_DATE_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r";VALUE=DATE(?:;|$)").expect("VALUE regex should be valid"));

pub fn summary(block: &str) -> String {
    value_of(&SUMMARY, block)
}

pub fn description(block: &str) -> String {
    value_of(&DESCRIPTION, block)
}

pub fn location(block: &str) -> String {
    value_of(&LOCATION, block)
}

pub fn status(block: &str) -> String {
    value_of(&STATUS, block)
}

/// The document's own `UID`.
pub fn uid(block: &str) -> String {
    value_of(&UID, block)
}

pub fn class(block: &str) -> String {
    value_of(&CLASS, block)
}

/// `SEQUENCE`, 0 when missing or not a number.
pub fn sequence(block: &str) -> u32 {
    value_of(&SEQUENCE, block).parse().unwrap_or(0)
}

pub fn created(block: &str) -> Option<DateTime<Utc>> {
    icsfeed_core::parse_basic_utc(&value_of(&CREATED, block))
}

pub fn last_modified(block: &str) -> Option<DateTime<Utc>> {
    icsfeed_core::parse_basic_utc(&value_of(&LAST_MODIFIED, block))
}

/// The raw `RRULE` value.
pub fn rrule(block: &str) -> String {
    value_of(&RRULE, block)
}

/// `GEO` as a coordinate pair.
///
/// Requires at least two `;`-separated tokens that parse as numbers.
pub fn geo(block: &str) -> Option<Geo> {
    let value = value_of(&GEO, block);
    let mut parts = value.split(';');
    let latitude = parts.next()?.trim().parse().ok()?;
    let longitude = parts.next()?.trim().parse().ok()?;
    Some(Geo::new(latitude, longitude))
}

/// `DURATION` in ISO 8601 notation (`PT1H30M`, `P1D`), zero when absent or
/// unparsable.
pub fn duration(block: &str) -> Duration {
    parse_duration(&value_of(&DURATION, block)).unwrap_or_else(Duration::zero)
}

/// Parses an ISO 8601 duration.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let parsed = iso8601::duration(value).ok()?;
    let std_duration: std::time::Duration = parsed.into();
    Duration::from_std(std_duration).ok()
}

/// A resolved `DTSTART`/`DTEND` value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTime {
    /// The instant in UTC (the epoch when the field is missing or malformed).
    pub utc: DateTime<Utc>,
    /// The zone identifier as written in the document.
    pub tzid: String,
    /// Set when the zone identifier could not be resolved.
    pub zone_error: Option<ParseError>,
}

/// Resolves `DTSTART`.
pub fn start(block: &str) -> ResolvedTime {
    time_property(&DTSTART, block)
}

/// Resolves `DTEND`.
pub fn end(block: &str) -> ResolvedTime {
    time_property(&DTEND, block)
}

fn time_property(pattern: &Regex, block: &str) -> ResolvedTime {
    let Some(caps) = pattern.captures(block) else {
        return ResolvedTime::default();
    };
    let params = caps.get(1).map_or("", |m| m.as_str());
    let value = caps.get(2).map_or("", |m| m.as_str().trim());

    // Whole-day form: midnight UTC of the date, no zone.
    if VALUE_DATE_PARAM.is_match(params) || (value.len() == 8 && !value.contains('T')) {
        let utc = parse_basic_date(value)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .unwrap_or_default();
        return ResolvedTime {
            utc,
            ..Default::default()
        };
    }

    let tzid = TZID_PARAM
        .captures(params)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim_matches('"').to_string())
        .unwrap_or_default();

    let Some(local) = parse_basic_local(value) else {
        return ResolvedTime {
            tzid,
            ..Default::default()
        };
    };

    if value.ends_with('Z') || tzid.is_empty() {
        return ResolvedTime {
            utc: local.and_utc(),
            tzid,
            zone_error: None,
        };
    }

    let (utc, zone_error) = match timezone::resolve_zone(&tzid) {
        Ok(tz) => (timezone::local_to_utc(local, tz), None),
        Err(err) => (local.and_utc(), Some(err)),
    };
    ResolvedTime {
        utc,
        tzid,
        zone_error,
    }
}

/// `X-WR-CALNAME` from calendar metadata.
pub fn calendar_name(meta: &str) -> String {
    value_of(&CALNAME, meta)
}

/// `X-WR-CALDESC` from calendar metadata.
pub fn calendar_description(meta: &str) -> String {
    value_of(&CALDESC, meta)
}

/// `VERSION`, 0 when missing or not a number.
pub fn calendar_version(meta: &str) -> f64 {
    value_of(&VERSION, meta).parse().unwrap_or(0.0)
}

/// The raw `X-WR-TIMEZONE` value.
pub fn calendar_timezone(meta: &str) -> String {
    value_of(&CALTZ, meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const BLOCK: &str = "BEGIN:VEVENT\r\n\
        UID:abc-123@example.com\r\n\
        SUMMARY;LANGUAGE=de:Teamtreffen\r\n\
        DESCRIPTION:First line of a long\r\n  description that is folded\r\n\
        STATUS:CONFIRMED\r\n\
        CLASS:PUBLIC\r\n\
        SEQUENCE:3\r\n\
        CREATED:20240101T080000Z\r\n\
        LAST-MODIFIED:20240102T093000Z\r\n\
        LOCATION:Room 4\r\n\
        GEO:37.386013;-122.082932\r\n\
        RRULE:FREQ=WEEKLY;BYDAY=MO\r\n\
        DTSTART:20240103T100000Z\r\n\
        DURATION:PT1H30M\r\n\
        END:VEVENT\r\n";

    #[test]
    fn text_fields() {
        assert_eq!(uid(BLOCK), "abc-123@example.com");
        assert_eq!(summary(BLOCK), "Teamtreffen");
        assert_eq!(status(BLOCK), "CONFIRMED");
        assert_eq!(class(BLOCK), "PUBLIC");
        assert_eq!(location(BLOCK), "Room 4");
        assert_eq!(rrule(BLOCK), "FREQ=WEEKLY;BYDAY=MO");
    }

    #[test]
    fn folded_description_is_unfolded() {
        assert_eq!(
            description(BLOCK),
            "First line of a long description that is folded"
        );
    }

    #[test]
    fn numeric_and_timestamp_fields() {
        assert_eq!(sequence(BLOCK), 3);
        assert_eq!(
            created(BLOCK),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap())
        );
        assert_eq!(
            last_modified(BLOCK),
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap())
        );
        assert_eq!(duration(BLOCK), Duration::minutes(90));
    }

    #[test]
    fn geo_pair() {
        let geo = geo(BLOCK).unwrap();
        assert_eq!(geo.latitude, 37.386013);
        assert_eq!(geo.longitude, -122.082932);
    }

    #[test]
    fn geo_requires_two_numbers() {
        assert!(geo("GEO:12.5\r\n").is_none());
        assert!(geo("GEO:north;south\r\n").is_none());
        assert!(geo("SUMMARY:no geo\r\n").is_none());
    }

    #[test]
    fn missing_fields_degrade_to_empty() {
        let block = "BEGIN:VEVENT\r\nEND:VEVENT\r\n";
        assert_eq!(summary(block), "");
        assert_eq!(uid(block), "");
        assert_eq!(sequence(block), 0);
        assert_eq!(created(block), None);
        assert_eq!(duration(block), Duration::zero());
        assert_eq!(start(block), ResolvedTime::default());
    }

    #[test]
    fn malformed_values_degrade_to_zero() {
        let block = "SEQUENCE:abc\r\nCREATED:yesterday\r\nDURATION:soon\r\n";
        assert_eq!(sequence(block), 0);
        assert_eq!(created(block), None);
        assert_eq!(duration(block), Duration::zero());
    }

    #[test]
    fn key_must_start_the_line() {
        let block = "X-STATUS:IGNORED\r\nSTATUS:TENTATIVE\r\n";
        assert_eq!(status(block), "TENTATIVE");
    }

    #[test]
    fn whole_day_start() {
        let resolved = start("DTSTART;VALUE=DATE:20250210\r\n");
        assert_eq!(resolved.utc, Utc.with_ymd_and_hms(2025, 2, 10, 0, 0, 0).unwrap());
        assert_eq!(resolved.tzid, "");
        assert!(resolved.zone_error.is_none());
    }

    #[test]
    fn utc_start() {
        let resolved = start(BLOCK);
        assert_eq!(resolved.utc, Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap());
        assert_eq!(resolved.tzid, "");
    }

    #[test]
    fn zoned_end_is_normalized() {
        let resolved = end("DTEND;TZID=Europe/Berlin:20240715T120000\r\n");
        // CEST is UTC+2 in July.
        assert_eq!(resolved.utc, Utc.with_ymd_and_hms(2024, 7, 15, 10, 0, 0).unwrap());
        assert_eq!(resolved.tzid, "Europe/Berlin");
    }

    #[test]
    fn quoted_tzid_and_value_param() {
        let block = "DTSTART;TZID=\"America/New_York\";VALUE=DATE-TIME:20240115T090000\r\n";
        let resolved = start(block);
        // EST is UTC-5 in January.
        assert_eq!(resolved.utc, Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap());
        assert_eq!(resolved.tzid, "America/New_York");
    }

    #[test]
    fn unknown_zone_falls_back_to_utc() {
        let resolved = start("DTSTART;TZID=Mars/Olympus:20240115T090000\r\n");
        assert_eq!(resolved.utc, Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap());
        assert_eq!(resolved.tzid, "Mars/Olympus");
        assert_eq!(
            resolved.zone_error,
            Some(ParseError::unknown_timezone("Mars/Olympus"))
        );
    }

    #[test]
    fn calendar_metadata() {
        let meta = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nX-WR-CALNAME:Holidays\r\n\
            X-WR-CALDESC:Public holidays\r\nX-WR-TIMEZONE:Europe/Paris\r\nEND:VCALENDAR\r\n";
        assert_eq!(calendar_name(meta), "Holidays");
        assert_eq!(calendar_description(meta), "Public holidays");
        assert_eq!(calendar_version(meta), 2.0);
        assert_eq!(calendar_timezone(meta), "Europe/Paris");
        assert_eq!(calendar_version("VERSION:two\r\n"), 0.0);
    }
}
