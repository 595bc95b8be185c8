//! End-to-end session tests over local files.

use std::path::Path;

use icsfeed_ingest::{IngestConfig, IngestError, Session};

const TEAM: &str = "BEGIN:VCALENDAR\r\n\
    VERSION:2.0\r\n\
    X-WR-CALNAME:Team\r\n\
    X-WR-TIMEZONE:Europe/Berlin\r\n\
    BEGIN:VEVENT\r\n\
    UID:retro@example.com\r\n\
    DTSTART;TZID=Europe/Berlin:20240105T150000\r\n\
    DTEND;TZID=Europe/Berlin:20240105T160000\r\n\
    SUMMARY:Retro\r\n\
    RRULE:FREQ=WEEKLY;COUNT=3\r\n\
    END:VEVENT\r\n\
    END:VCALENDAR\r\n";

const HOLIDAYS: &str = "BEGIN:VCALENDAR\r\n\
    VERSION:2.0\r\n\
    X-WR-CALNAME:Holidays\r\n\
    BEGIN:VEVENT\r\n\
    UID:newyear@example.com\r\n\
    DTSTART;VALUE=DATE:20250101\r\n\
    DTEND;VALUE=DATE:20250102\r\n\
    SUMMARY:New Year\r\n\
    END:VEVENT\r\n\
    END:VCALENDAR\r\n";

fn write(dir: &Path, name: &str, text: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path.to_str().unwrap().to_string()
}

#[tokio::test]
async fn zero_sources_drain_immediately() {
    let session = Session::new(IngestConfig::default()).unwrap();

    assert!(session.is_drained());
    assert!(session.calendars().unwrap().is_empty());
    assert!(session.errors().unwrap().is_empty());
}

#[tokio::test]
async fn one_failing_source_out_of_three() {
    let dir = tempfile::tempdir().unwrap();
    let team = write(dir.path(), "team.ics", TEAM);
    let holidays = write(dir.path(), "holidays.ics", HOLIDAYS);
    let missing = dir.path().join("missing.ics").to_str().unwrap().to_string();

    let mut session = Session::new(IngestConfig::default()).unwrap();
    session.submit(team.clone());
    session.submit(missing.clone());
    session.submit(holidays.clone());

    let mut summaries = Vec::new();
    while let Some(event) = session.next_event().await {
        summaries.push(event.summary);
    }
    summaries.sort();

    assert_eq!(session.in_flight(), 0);
    assert_eq!(summaries, vec!["New Year", "Retro", "Retro", "Retro"]);

    let mut calendars = session.calendars().unwrap();
    calendars.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(calendars.len(), 2);
    assert_eq!(calendars[0].name, "Holidays");
    assert_eq!(calendars[0].url, holidays);
    assert_eq!(calendars[1].name, "Team");
    assert_eq!(calendars[1].timezone, chrono_tz::Tz::Europe__Berlin);

    let errors = session.errors().unwrap();
    assert_eq!(errors, vec![IngestError::not_found(missing)]);
    assert!(errors[0].is_retrieval());
}

#[tokio::test]
async fn events_carry_their_calendar() {
    let dir = tempfile::tempdir().unwrap();
    let team = write(dir.path(), "team.ics", TEAM);

    let session = Session::new(
        IngestConfig::default()
            .with_apply_recurrence_rules(false)
            .with_temp_file_path(dir.path()),
    )
    .unwrap();
    session.submit(format!("file://{team}"));
    session.wait().await;

    let calendars = session.calendars().unwrap();
    assert_eq!(calendars.len(), 1);
    let calendar = &calendars[0];
    assert_eq!(calendar.events.len(), 1);
    assert!(calendar.events.iter().all(|e| e.calendar_id == calendar.id));
    assert_eq!(calendar.events[0].start_tzid, "Europe/Berlin");
}

#[tokio::test]
async fn max_occurrences_applies_per_master() {
    let dir = tempfile::tempdir().unwrap();
    let open_ended = TEAM.replace("RRULE:FREQ=WEEKLY;COUNT=3", "RRULE:FREQ=DAILY");
    let path = write(dir.path(), "open.ics", &open_ended);

    let session = Session::new(IngestConfig::default().with_max_recurrence_occurrences(7)).unwrap();
    session.submit(path);
    session.wait().await;

    let calendars = session.calendars().unwrap();
    assert_eq!(calendars[0].events.len(), 8);
}
