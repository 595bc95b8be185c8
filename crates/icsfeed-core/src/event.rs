//! Event, attendee and geo types.
//!
//! An [`Event`] is a plain data holder populated by the parser. Missing or
//! malformed fields stay at their empty value (`""`, `0`, `None`) instead of
//! failing the whole event.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A participant of an event (attendee or organizer).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    /// Email taken from the `mailto:` value.
    pub email: String,
    /// Display name from the `CN=` parameter.
    pub name: String,
    /// `ROLE=` parameter (e.g. `REQ-PARTICIPANT`).
    pub role: String,
    /// `PARTSTAT=` parameter (e.g. `ACCEPTED`).
    pub status: String,
    /// `CUTYPE=` parameter (e.g. `INDIVIDUAL`, `ROOM`).
    pub kind: String,
}

impl Attendee {
    /// Creates an attendee with only the email set.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }

    /// Returns true if no field could be extracted.
    pub fn is_empty(&self) -> bool {
        self.email.is_empty()
            && self.name.is_empty()
            && self.role.is_empty()
            && self.status.is_empty()
            && self.kind.is_empty()
    }
}

/// A latitude/longitude pair from the `GEO` property.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    pub latitude: f64,
    pub longitude: f64,
}

impl Geo {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A calendar event, either a master definition or a generated occurrence.
///
/// Occurrences are independent value copies of their master with `start`,
/// `end`, `id` and `sequence` overwritten.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Derived identifier, see [`Event::derive_id`].
    pub id: String,
    /// The document's own `UID` value.
    pub imported_id: String,

    /// Start instant, normalized to UTC.
    pub start: DateTime<Utc>,
    /// End instant, normalized to UTC.
    pub end: DateTime<Utc>,
    /// Zone identifier the start was written in (empty for UTC/date values).
    pub start_tzid: String,
    /// Zone identifier the end was written in.
    pub end_tzid: String,
    /// True iff both start and end fall exactly on midnight.
    pub whole_day: bool,

    pub status: String,
    pub summary: String,
    pub description: String,
    pub class: String,
    pub sequence: u32,
    pub created: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,

    /// Raw `RRULE` value, empty when the event does not recur.
    pub rrule: String,
    pub location: String,
    pub geo: Option<Geo>,

    pub attendees: Vec<Attendee>,
    pub organizer: Option<Attendee>,

    /// Id of the owning [`crate::Calendar`].
    pub calendar_id: u64,
}

impl Event {
    /// Returns the time span between start and end.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns true if the event carries a recurrence rule.
    pub fn is_recurring(&self) -> bool {
        !self.rrule.trim().is_empty()
    }

    /// Computes the derived identifier from the event's content.
    ///
    /// Pure function of the field values (the current `id` is ignored), so two
    /// events with equal fields share an identifier and occurrences of the same
    /// master differ by their start.
    pub fn derive_id(&self) -> String {
        let mut hasher = Sha256::new();
        for part in [
            self.imported_id.as_str(),
            self.summary.as_str(),
            self.description.as_str(),
            self.location.as_str(),
            self.status.as_str(),
            self.class.as_str(),
        ] {
            hasher.update(part.as_bytes());
            hasher.update([0x1f]);
        }
        hasher.update(self.start.timestamp().to_le_bytes());
        hasher.update(self.end.timestamp().to_le_bytes());
        hex::encode(hasher.finalize())
    }

    /// Recomputes and stores the derived identifier.
    pub fn refresh_id(&mut self) {
        self.id = self.derive_id();
    }
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes
            .as_ref()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}
