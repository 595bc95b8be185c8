//! Attendee and organizer extraction.
//!
//! Each `ATTENDEE`/`ORGANIZER` property spans its own line plus any folded
//! continuation lines. After unfolding, participant parameters are read from
//! the property text: every parameter ends at the next `;`, or at the `:`
//! that separates parameters from the `mailto:` value.

use std::sync::LazyLock;

use icsfeed_core::Attendee;
use regex::Regex;

use crate::fields::unfold;

static ATTENDEE_BLOCK: LazyLock<Regex> = LazyLock::new(|| participant_regex("ATTENDEE"));
static ORGANIZER_BLOCK: LazyLock<Regex> = LazyLock::new(|| participant_regex("ORGANIZER"));

static MAILTO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)mailto:([^\s;]*)").expect("mailto regex should be valid")
});
static CN: LazyLock<Regex> = LazyLock::new(|| param_regex("CN"));
static ROLE: LazyLock<Regex> = LazyLock::new(|| param_regex("ROLE"));
static PARTSTAT: LazyLock<Regex> = LazyLock::new(|| param_regex("PARTSTAT"));
static CUTYPE: LazyLock<Regex> = LazyLock::new(|| param_regex("CUTYPE"));

fn participant_regex(name: &str) -> Regex {
    Regex::new(&format!(r"(?m)^{name}[;:].*(?:\r?\n[ \t].*)*"))
        .expect("participant regex should be valid")
}

fn param_regex(name: &str) -> Regex {
    Regex::new(&format!(r#"[;:]{name}=("[^"]*"|[^;:]*)"#)).expect("param regex should be valid")
}

fn param(pattern: &Regex, text: &str) -> String {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().trim_matches('"').to_string())
        .unwrap_or_default()
}

fn email(text: &str) -> String {
    MAILTO
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Decodes one unfolded `ATTENDEE` property.
pub fn parse_attendee(text: &str) -> Attendee {
    Attendee {
        email: email(text),
        name: param(&CN, text),
        role: param(&ROLE, text),
        status: param(&PARTSTAT, text),
        kind: param(&CUTYPE, text),
    }
}

/// Extracts every attendee of an event block, dropping those where nothing
/// could be read.
pub fn attendees(block: &str) -> Vec<Attendee> {
    ATTENDEE_BLOCK
        .find_iter(block)
        .map(|m| parse_attendee(&unfold(m.as_str())))
        .filter(|attendee| !attendee.is_empty())
        .collect()
}

/// Extracts the organizer (email and display name only).
pub fn organizer(block: &str) -> Option<Attendee> {
    let text = unfold(ORGANIZER_BLOCK.find(block)?.as_str());
    Some(Attendee {
        email: email(&text),
        name: param(&CN, &text),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: &str = "BEGIN:VEVENT\r\n\
        UID:meeting-1\r\n\
        ORGANIZER;CN=Jane Doe:mailto:jane@example.com\r\n\
        ATTENDEE;CUTYPE=INDIVIDUAL;ROLE=REQ-PARTICIPANT;PARTSTAT=ACCEPTED;CN=Bob\r\n  Smith;X-NUM-GUESTS=0:mailto:bob@example.com\r\n\
        ATTENDEE;CUTYPE=ROOM;ROLE=NON-PARTICIPANT;PARTSTAT=NEEDS-ACTION;CN=\"Room, 4th floor\":mailto:room4@example.com\r\n\
        ATTENDEE:mailto:plain@example.com\r\n\
        ATTENDEE;X-UNKNOWN=1:nothing-useful\r\n\
        END:VEVENT\r\n";

    #[test]
    fn extracts_attendee_parameters() {
        let list = attendees(BLOCK);
        assert_eq!(list.len(), 3);

        let bob = &list[0];
        assert_eq!(bob.email, "bob@example.com");
        assert_eq!(bob.name, "Bob Smith");
        assert_eq!(bob.role, "REQ-PARTICIPANT");
        assert_eq!(bob.status, "ACCEPTED");
        assert_eq!(bob.kind, "INDIVIDUAL");

        let room = &list[1];
        assert_eq!(room.name, "Room, 4th floor");
        assert_eq!(room.kind, "ROOM");
        assert_eq!(room.status, "NEEDS-ACTION");
    }

    #[test]
    fn email_only_attendee_is_kept() {
        let list = attendees(BLOCK);
        let plain = &list[2];
        assert_eq!(plain.email, "plain@example.com");
        assert_eq!(plain.name, "");
        assert_eq!(plain.role, "");
    }

    #[test]
    fn unrecognizable_attendee_is_dropped() {
        let list = attendees("ATTENDEE;X-UNKNOWN=1:nothing-useful\r\n");
        assert!(list.is_empty());
    }

    #[test]
    fn organizer_name_and_email() {
        let org = organizer(BLOCK).unwrap();
        assert_eq!(org.email, "jane@example.com");
        assert_eq!(org.name, "Jane Doe");
        assert_eq!(org.role, "");
    }

    #[test]
    fn missing_organizer() {
        assert!(organizer("BEGIN:VEVENT\r\nEND:VEVENT\r\n").is_none());
    }
}
