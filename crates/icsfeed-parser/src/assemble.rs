//! Calendar and event assembly.
//!
//! Glues the segmenter, field extractors, attendee extractor, timezone
//! resolver and recurrence expander together into one [`Calendar`].

use chrono::Duration;
use icsfeed_core::time::is_midnight;
use icsfeed_core::{Calendar, Event};
use tracing::{debug, warn};

use crate::attendee::{attendees, organizer};
use crate::error::ParseError;
use crate::fields;
use crate::recurrence::{ExpandOptions, expand};
use crate::segment::segment;
use crate::timezone::resolve_zone;

/// Result of parsing one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    /// The calendar with its events in delivery order (each master followed by
    /// its occurrences).
    pub calendar: Calendar,
    /// Zone identifiers that fell back to UTC, one entry per distinct name.
    pub errors: Vec<ParseError>,
}

/// Parses a whole document into a calendar.
///
/// `url` is recorded as the calendar's source locator; `calendar_id` becomes
/// its identity and every event's back-reference.
pub fn parse_document(
    text: &str,
    url: &str,
    calendar_id: u64,
    options: &ExpandOptions,
) -> Parsed {
    let segments = segment(text);
    let mut errors = Vec::new();

    let mut calendar = Calendar::new(calendar_id);
    calendar.url = url.to_string();
    calendar.name = fields::calendar_name(&segments.meta);
    calendar.description = fields::calendar_description(&segments.meta);
    calendar.version = fields::calendar_version(&segments.meta);

    let tz_name = fields::calendar_timezone(&segments.meta);
    if !tz_name.is_empty() {
        match resolve_zone(&tz_name) {
            Ok(tz) => calendar.timezone = tz,
            Err(err) => {
                warn!(url, tzid = %tz_name, "Unknown calendar timezone, using UTC");
                record(&mut errors, err);
            }
        }
    }

    for block in segments.events {
        let (master, zone_errors) = assemble_event(block);
        for err in zone_errors {
            warn!(url, uid = %master.imported_id, %err, "Event timezone fell back to UTC");
            record(&mut errors, err);
        }

        let occurrences = expand(&master, options);
        calendar.push_event(master);
        for occurrence in occurrences {
            calendar.push_event(occurrence);
        }
    }

    debug!(
        url,
        calendar_id,
        events = calendar.events.len(),
        timezones = segments.timezones.len(),
        "Parsed document"
    );

    Parsed { calendar, errors }
}

/// Builds one master event from a `VEVENT` block.
///
/// Returns the event together with any zone resolution problems found in
/// its start or end.
pub fn assemble_event(block: &str) -> (Event, Vec<ParseError>) {
    let start = fields::start(block);
    let end = fields::end(block);

    let mut zone_errors = Vec::new();
    for err in [&start.zone_error, &end.zone_error].into_iter().flatten() {
        record(&mut zone_errors, err.clone());
    }

    // A duration that would leave the representable range collapses to zero.
    let end_utc = if end.utc < start.utc {
        let duration = fields::duration(block).max(Duration::zero());
        start.utc.checked_add_signed(duration).unwrap_or(start.utc)
    } else {
        end.utc
    };

    let mut event = Event {
        imported_id: fields::uid(block),
        start: start.utc,
        end: end_utc,
        start_tzid: start.tzid,
        end_tzid: end.tzid,
        whole_day: is_midnight(&start.utc) && is_midnight(&end_utc),
        status: fields::status(block),
        summary: fields::summary(block),
        description: fields::description(block),
        class: fields::class(block),
        sequence: fields::sequence(block),
        created: fields::created(block),
        last_modified: fields::last_modified(block),
        rrule: fields::rrule(block),
        location: fields::location(block),
        geo: fields::geo(block),
        attendees: attendees(block),
        organizer: organizer(block),
        ..Default::default()
    };
    event.refresh_id();

    (event, zone_errors)
}

fn record(errors: &mut Vec<ParseError>, err: ParseError) {
    if !errors.contains(&err) {
        errors.push(err);
    }
}
