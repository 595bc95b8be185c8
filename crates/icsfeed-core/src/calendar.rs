//! Calendar type.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::event::Event;

/// A parsed calendar document and the events it produced.
///
/// Events keep parse order: each master event is followed by its generated
/// occurrences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    /// Session-scoped identity, assigned once per parsed document.
    pub id: u64,
    /// `X-WR-CALNAME`.
    pub name: String,
    /// `X-WR-CALDESC`.
    pub description: String,
    /// `VERSION`, 0 when missing or malformed.
    pub version: f64,
    /// Default zone from `X-WR-TIMEZONE`, UTC when absent or unknown.
    pub timezone: Tz,
    /// Locator the document was loaded from (empty for direct loads).
    pub url: String,
    pub events: Vec<Event>,
}

impl Calendar {
    /// Creates an empty calendar with the given identity.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            name: String::new(),
            description: String::new(),
            version: 0.0,
            timezone: Tz::UTC,
            url: String::new(),
            events: Vec::new(),
        }
    }

    /// Appends an event, claiming ownership of it.
    pub fn push_event(&mut self, mut event: Event) {
        event.calendar_id = self.id;
        self.events.push(event);
    }

    /// Looks up an event by its derived identifier.
    pub fn event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Returns all events generated from the master with the given `UID`.
    pub fn series<'a>(&'a self, imported_id: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.events
            .iter()
            .filter(move |e| e.imported_id == imported_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_event_sets_owner() {
        let mut cal = Calendar::new(7);
        let mut event = Event {
            imported_id: "uid-1".to_string(),
            ..Default::default()
        };
        event.refresh_id();
        let id = event.id.clone();

        cal.push_event(event);

        assert_eq!(cal.events.len(), 1);
        assert_eq!(cal.event(&id).map(|e| e.calendar_id), Some(7));
        assert_eq!(cal.series("uid-1").count(), 1);
        assert_eq!(cal.series("uid-2").count(), 0);
    }

    #[test]
    fn new_calendar_defaults() {
        let cal = Calendar::new(1);
        assert_eq!(cal.timezone, Tz::UTC);
        assert_eq!(cal.version, 0.0);
        assert!(cal.events.is_empty());
    }
}
