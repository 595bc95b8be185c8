//! Document segmentation.
//!
//! Splits a raw iCalendar document into its `VEVENT` blocks, its `VTIMEZONE`
//! blocks and the remaining calendar-level text. Blocks are matched
//! non-greedily: each one runs from its `BEGIN:` line to the first following
//! `END:` line, terminator included. Unterminated blocks are simply not
//! returned.

use std::sync::LazyLock;

use regex::Regex;

static EVENT_BLOCK: LazyLock<Regex> = LazyLock::new(|| component_regex("VEVENT"));
static TIMEZONE_BLOCK: LazyLock<Regex> = LazyLock::new(|| component_regex("VTIMEZONE"));

/// Builds the block pattern for a component name.
pub(crate) fn component_regex(name: &str) -> Regex {
    Regex::new(&format!(r"BEGIN:{name}\r?\n(?:.*\n)*?END:{name}\r?\n"))
        .expect("component regex should be valid")
}

/// The pieces of a segmented document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segments<'a> {
    /// Verbatim `VEVENT` blocks in document order.
    pub events: Vec<&'a str>,
    /// Verbatim `VTIMEZONE` blocks in document order.
    pub timezones: Vec<&'a str>,
    /// The document with every event block removed (timezones stay in place).
    pub meta: String,
}

/// Segments a document into events, timezone rules and calendar metadata.
pub fn segment(document: &str) -> Segments<'_> {
    let events: Vec<&str> = EVENT_BLOCK
        .find_iter(document)
        .map(|m| m.as_str())
        .collect();
    let timezones = TIMEZONE_BLOCK
        .find_iter(document)
        .map(|m| m.as_str())
        .collect();
    let meta = EVENT_BLOCK.replace_all(document, "").into_owned();

    Segments {
        events,
        timezones,
        meta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "BEGIN:VCALENDAR\r\n\
        VERSION:2.0\r\n\
        X-WR-CALNAME:Team\r\n\
        BEGIN:VTIMEZONE\r\n\
        TZID:Europe/Berlin\r\n\
        END:VTIMEZONE\r\n\
        BEGIN:VEVENT\r\n\
        UID:one\r\n\
        END:VEVENT\r\n\
        BEGIN:VEVENT\r\n\
        UID:two\r\n\
        SUMMARY:Second\r\n\
        END:VEVENT\r\n\
        END:VCALENDAR\r\n";

    #[test]
    fn splits_events_and_timezones() {
        let segments = segment(DOC);

        assert_eq!(segments.events.len(), 2);
        assert_eq!(
            segments.events[0],
            "BEGIN:VEVENT\r\nUID:one\r\nEND:VEVENT\r\n"
        );
        assert!(segments.events[1].contains("SUMMARY:Second"));
        assert!(segments.events[1].ends_with("END:VEVENT\r\n"));

        assert_eq!(segments.timezones.len(), 1);
        assert!(segments.timezones[0].contains("TZID:Europe/Berlin"));
    }

    #[test]
    fn meta_keeps_timezones_but_drops_events() {
        let segments = segment(DOC);

        assert!(segments.meta.contains("X-WR-CALNAME:Team"));
        assert!(segments.meta.contains("BEGIN:VTIMEZONE"));
        assert!(!segments.meta.contains("VEVENT"));
        assert!(!segments.meta.contains("UID:"));
    }

    #[test]
    fn accepts_bare_line_feeds() {
        let doc = "BEGIN:VCALENDAR\nBEGIN:VEVENT\nUID:lf\nEND:VEVENT\nEND:VCALENDAR\n";
        let segments = segment(doc);
        assert_eq!(segments.events, vec!["BEGIN:VEVENT\nUID:lf\nEND:VEVENT\n"]);
    }

    #[test]
    fn unterminated_block_yields_nothing() {
        let doc = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nUID:open\r\nEND:VCALENDAR\r\n";
        let segments = segment(doc);
        assert!(segments.events.is_empty());
        assert_eq!(segments.meta, doc);
    }

    #[test]
    fn empty_document() {
        let segments = segment("");
        assert!(segments.events.is_empty());
        assert!(segments.timezones.is_empty());
        assert!(segments.meta.is_empty());
    }
}
