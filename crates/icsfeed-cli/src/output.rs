//! Event rendering.

use icsfeed_core::{Calendar, Event};
use icsfeed_ingest::IngestError;

use crate::error::CliResult;

/// Renders one event as a single human-readable line.
pub fn event_line(event: &Event) -> String {
    let when = if event.whole_day {
        format!("{} (all day)", event.start.format("%Y-%m-%d"))
    } else {
        format!(
            "{} - {} UTC",
            event.start.format("%Y-%m-%d %H:%M"),
            event.end.format("%H:%M")
        )
    };
    let title = if event.summary.is_empty() {
        "(no title)"
    } else {
        &event.summary
    };

    let mut line = format!("{when}  {title}");
    if !event.location.is_empty() {
        line.push_str(" @ ");
        line.push_str(&event.location);
    }
    line
}

/// Renders one event as a JSON object on a single line.
pub fn event_json(event: &Event) -> CliResult<String> {
    Ok(serde_json::to_string(event)?)
}

/// One-line tally printed after all events.
pub fn summary_line(calendars: &[Calendar], errors: &[IngestError]) -> String {
    let events: usize = calendars.iter().map(|c| c.events.len()).sum();
    let failed = errors.iter().filter(|e| e.is_retrieval()).count();
    format!(
        "{} calendar(s), {} event(s), {} failed source(s), {} warning(s)",
        calendars.len(),
        events,
        failed,
        errors.len() - failed
    )
}
