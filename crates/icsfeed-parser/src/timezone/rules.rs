//! Current UTC offset from a document's embedded `VTIMEZONE` rules.
//!
//! This reports the offset in force at the moment of the call, not at the time
//! of any particular event. Per-event conversion goes through
//! [`super::local_to_utc`] and the zone database instead. Transitions are
//! approximated as the first Sunday of the `BYMONTH` month in the current
//! year, at midnight UTC.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use icsfeed_core::time::nth_weekday_of_month;
use regex::Regex;
use tracing::debug;

use crate::segment::component_regex;

/// Offset reported when no rule block matches.
pub const DEFAULT_OFFSET: &str = "+0000";

static STANDARD_BLOCK: LazyLock<Regex> = LazyLock::new(|| component_regex("STANDARD"));
static DAYLIGHT_BLOCK: LazyLock<Regex> = LazyLock::new(|| component_regex("DAYLIGHT"));
static RULE_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^RRULE:.*BYMONTH=(\d{1,2})").expect("rule month regex should be valid")
});
static OFFSET_TO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^TZOFFSETTO:(.*)$").expect("offset regex should be valid")
});

/// One `STANDARD` or `DAYLIGHT` sub-block.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Observance {
    offset: String,
    month: Option<u32>,
}

impl Observance {
    fn find(pattern: &Regex, block: &str) -> Option<Self> {
        let text = pattern.find(block)?.as_str();
        let offset = OFFSET_TO
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())?;
        let month = RULE_MONTH
            .captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok());
        Some(Self { offset, month })
    }

    /// The transition date in `year`, or `None` without a usable rule.
    fn transition(&self, year: i32) -> Option<NaiveDate> {
        nth_weekday_of_month(year, self.month?, Weekday::Sun, 1)
    }
}

/// Returns the offset literal (e.g. `+0200`) in force right now for `tzid`.
pub fn current_offset(timezones: &[&str], tzid: &str) -> String {
    current_offset_at(timezones, tzid, Utc::now())
}

/// Returns the offset literal in force at `now` for `tzid`.
///
/// Uses the first `VTIMEZONE` block whose `TZID` line contains `tzid`. When
/// the block has both observances and `now` lies between the daylight and the
/// standard transition, the daylight offset is returned, otherwise the
/// standard one. Falls back to [`DEFAULT_OFFSET`].
pub fn current_offset_at(timezones: &[&str], tzid: &str, now: DateTime<Utc>) -> String {
    let needle = format!("TZID:{tzid}");
    let Some(block) = timezones.iter().find(|block| block.contains(&needle)) else {
        return DEFAULT_OFFSET.to_string();
    };

    let standard = Observance::find(&STANDARD_BLOCK, block);
    let daylight = Observance::find(&DAYLIGHT_BLOCK, block);

    let (standard, daylight) = match (standard, daylight) {
        (Some(standard), Some(daylight)) => (standard, daylight),
        (Some(only), None) | (None, Some(only)) => return only.offset,
        (None, None) => return DEFAULT_OFFSET.to_string(),
    };

    let year = now.year();
    let (Some(std_day), Some(dst_day)) = (standard.transition(year), daylight.transition(year))
    else {
        return standard.offset;
    };
    let std_start = std_day.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
    let dst_start = dst_day.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();

    // Southern-hemisphere zones start daylight time late in the year.
    let in_daylight = if dst_start < std_start {
        now > dst_start && now < std_start
    } else {
        now > dst_start || now < std_start
    };

    debug!(tzid, %std_day, %dst_day, in_daylight, "Resolved offset from zone rules");

    if in_daylight {
        daylight.offset
    } else {
        standard.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const BERLIN: &str = "BEGIN:VTIMEZONE\r\n\
        TZID:Europe/Berlin\r\n\
        BEGIN:DAYLIGHT\r\n\
        TZOFFSETFROM:+0100\r\n\
        TZOFFSETTO:+0200\r\n\
        DTSTART:19700329T020000\r\n\
        RRULE:FREQ=YEARLY;BYDAY=-1SU;BYMONTH=3\r\n\
        END:DAYLIGHT\r\n\
        BEGIN:STANDARD\r\n\
        TZOFFSETFROM:+0200\r\n\
        TZOFFSETTO:+0100\r\n\
        DTSTART:19701025T030000\r\n\
        RRULE:FREQ=YEARLY;BYDAY=-1SU;BYMONTH=10\r\n\
        END:STANDARD\r\n\
        END:VTIMEZONE\r\n";

    const SYDNEY: &str = "BEGIN:VTIMEZONE\r\n\
        TZID:Australia/Sydney\r\n\
        BEGIN:STANDARD\r\n\
        TZOFFSETTO:+1000\r\n\
        RRULE:FREQ=YEARLY;BYDAY=1SU;BYMONTH=4\r\n\
        END:STANDARD\r\n\
        BEGIN:DAYLIGHT\r\n\
        TZOFFSETTO:+1100\r\n\
        RRULE:FREQ=YEARLY;BYDAY=1SU;BYMONTH=10\r\n\
        END:DAYLIGHT\r\n\
        END:VTIMEZONE\r\n";

    const TOKYO: &str = "BEGIN:VTIMEZONE\r\n\
        TZID:Asia/Tokyo\r\n\
        BEGIN:STANDARD\r\n\
        TZOFFSETTO:+0900\r\n\
        END:STANDARD\r\n\
        END:VTIMEZONE\r\n";

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn summer_uses_daylight_offset() {
        assert_eq!(
            current_offset_at(&[BERLIN], "Europe/Berlin", at(2024, 7, 1)),
            "+0200"
        );
    }

    #[test]
    fn winter_uses_standard_offset() {
        assert_eq!(
            current_offset_at(&[BERLIN], "Europe/Berlin", at(2024, 1, 15)),
            "+0100"
        );
        assert_eq!(
            current_offset_at(&[BERLIN], "Europe/Berlin", at(2024, 12, 1)),
            "+0100"
        );
    }

    #[test]
    fn transitions_use_first_sunday() {
        // First Sunday of March 2024 is the 3rd, of October the 6th.
        assert_eq!(
            current_offset_at(&[BERLIN], "Europe/Berlin", at(2024, 3, 2)),
            "+0100"
        );
        assert_eq!(
            current_offset_at(&[BERLIN], "Europe/Berlin", at(2024, 3, 4)),
            "+0200"
        );
        assert_eq!(
            current_offset_at(&[BERLIN], "Europe/Berlin", at(2024, 10, 7)),
            "+0100"
        );
    }

    #[test]
    fn southern_hemisphere_wraps_the_year() {
        assert_eq!(
            current_offset_at(&[SYDNEY], "Australia/Sydney", at(2024, 1, 15)),
            "+1100"
        );
        assert_eq!(
            current_offset_at(&[SYDNEY], "Australia/Sydney", at(2024, 7, 15)),
            "+1000"
        );
    }

    #[test]
    fn single_observance() {
        assert_eq!(
            current_offset_at(&[BERLIN, TOKYO], "Asia/Tokyo", at(2024, 7, 1)),
            "+0900"
        );
    }

    #[test]
    fn unknown_zone_uses_default() {
        assert_eq!(
            current_offset_at(&[BERLIN], "America/Denver", at(2024, 7, 1)),
            DEFAULT_OFFSET
        );
        assert_eq!(current_offset(&[], "Europe/Berlin"), DEFAULT_OFFSET);
    }
}
