//! Recurrence expansion.
//!
//! Turns a master event with an `RRULE` into a bounded series of occurrence
//! events. Supported rule parts: `FREQ` (DAILY/WEEKLY/MONTHLY/YEARLY),
//! `INTERVAL`, `COUNT`, `UNTIL`, `BYMONTH` and `BYDAY`. Exception dates and
//! overridden instances are not handled.
//!
//! The walk starts at the master's start and advances one step at a time:
//! `INTERVAL` days, 7 days (weekly rules always move a single week),
//! `INTERVAL` months or `INTERVAL` years. Each step is computed from the
//! master start, so month-end anchors do not drift after a short month.

use chrono::{DateTime, Datelike, Days, Months, Utc, Weekday};
use icsfeed_core::time::{parse_basic_date, parse_basic_utc, parse_weekday_code};
use icsfeed_core::Event;
use tracing::debug;

/// Hard limit on loop steps for rules whose filters never match.
const MAX_STEPS: u32 = 100_000;

/// Controls whether and how far recurrence rules are expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Expand rules at all.
    pub apply: bool,
    /// Cap on generated occurrences per master event.
    pub max_occurrences: usize,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            apply: true,
            max_occurrences: 1000,
        }
    }
}

/// `FREQ` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Some(Self::Daily),
            "WEEKLY" => Some(Self::Weekly),
            "MONTHLY" => Some(Self::Monthly),
            "YEARLY" => Some(Self::Yearly),
            _ => None,
        }
    }
}

/// The parts of an `RRULE` the expander understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub frequency: Option<Frequency>,
    /// Always at least 1.
    pub interval: u32,
    /// `None` when absent or zero.
    pub count: Option<u32>,
    pub until: Option<DateTime<Utc>>,
    pub by_month: Vec<u32>,
    pub by_day: Vec<Weekday>,
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        Self {
            frequency: None,
            interval: 1,
            count: None,
            until: None,
            by_month: Vec::new(),
            by_day: Vec::new(),
        }
    }
}

impl RecurrenceRule {
    /// Parses raw rule text such as `FREQ=WEEKLY;BYDAY=MO,WE;UNTIL=20240131T000000Z`.
    ///
    /// Unknown parts are ignored and malformed values fall back to defaults.
    /// A date-only `UNTIL` bounds the series at the end of that day.
    pub fn parse(text: &str) -> Self {
        let mut rule = Self::default();

        for part in text.trim().split(';') {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim().to_ascii_uppercase().as_str() {
                "FREQ" => rule.frequency = Frequency::parse(value),
                "INTERVAL" => rule.interval = value.parse().ok().filter(|&i| i > 0).unwrap_or(1),
                "COUNT" => rule.count = value.parse().ok().filter(|&c| c > 0),
                "UNTIL" => {
                    rule.until = parse_basic_utc(value).or_else(|| {
                        parse_basic_date(value)
                            .and_then(|d| d.and_hms_opt(23, 59, 59))
                            .map(|naive| naive.and_utc())
                    })
                }
                "BYMONTH" => {
                    rule.by_month = value
                        .split(',')
                        .filter_map(|m| m.trim().parse().ok())
                        .filter(|m| (1..=12).contains(m))
                        .collect()
                }
                "BYDAY" => {
                    rule.by_day = value
                        .split(',')
                        .filter_map(|token| {
                            let token = token.trim();
                            let code = token.get(token.len().checked_sub(2)?..)?;
                            parse_weekday_code(code)
                        })
                        .collect()
                }
                _ => {}
            }
        }

        rule
    }

    /// Returns the `n`-th stepped date from `start` (step 0 is `start`).
    pub fn step(&self, start: DateTime<Utc>, n: u32) -> Option<DateTime<Utc>> {
        let frequency = self.frequency?;
        let n = u64::from(n);
        let interval = u64::from(self.interval);
        match frequency {
            Frequency::Daily => start.checked_add_days(Days::new(n * interval)),
            Frequency::Weekly => start.checked_add_days(Days::new(n * 7)),
            Frequency::Monthly => {
                let months = u32::try_from(n * interval).ok()?;
                start.checked_add_months(Months::new(months))
            }
            Frequency::Yearly => {
                let months = u32::try_from(n * interval * 12).ok()?;
                start.checked_add_months(Months::new(months))
            }
        }
    }

    fn month_matches(&self, date: &DateTime<Utc>) -> bool {
        self.by_month.is_empty() || self.by_month.contains(&date.month())
    }

    fn is_after_until(&self, date: &DateTime<Utc>) -> bool {
        self.until.is_some_and(|until| *date > until)
    }

    /// Candidate dates for one stepped date, before `UNTIL` filtering.
    fn candidates(&self, stepped: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        if self.by_day.is_empty() {
            return vec![stepped];
        }
        (0..7)
            .filter_map(|offset| stepped.checked_add_days(Days::new(offset)))
            .filter(|day| self.by_day.contains(&day.weekday()))
            .collect()
    }
}

/// Generates the occurrences of a recurring master event.
///
/// Returns an empty list when expansion is disabled, the event has no rule or
/// the rule has no usable `FREQ`. Occurrences come out in ascending date order,
/// never repeat the master's own start, and carry a fresh derived id and a
/// sequence number equal to their 1-based position in the series.
///
/// `COUNT` bounds the whole series including the master. Dates after `UNTIL`
/// are skipped; the walk ends once a stepped date passes `UNTIL`, the budget is
/// used up, or `max_occurrences` is reached.
pub fn expand(master: &Event, options: &ExpandOptions) -> Vec<Event> {
    if !options.apply || !master.is_recurring() {
        return Vec::new();
    }

    let rule = RecurrenceRule::parse(&master.rrule);
    if rule.frequency.is_none() {
        debug!(uid = %master.imported_id, rrule = %master.rrule, "Skipping rule without FREQ");
        return Vec::new();
    }

    let budget = rule
        .count
        .map(|count| count.saturating_sub(1) as usize)
        .unwrap_or(options.max_occurrences)
        .min(options.max_occurrences);
    let duration = master.duration();
    let mut occurrences: Vec<Event> = Vec::new();
    let mut last_emitted = master.start;

    'walk: for n in 0..MAX_STEPS {
        if occurrences.len() >= budget {
            break;
        }
        let Some(stepped) = rule.step(master.start, n) else {
            break;
        };
        if rule.is_after_until(&stepped) {
            break;
        }
        if !rule.month_matches(&stepped) {
            continue;
        }

        for day in rule.candidates(stepped) {
            if day == master.start || rule.is_after_until(&day) {
                continue;
            }
            // Daily steps with BYDAY revisit days already emitted.
            if !occurrences.is_empty() && day <= last_emitted {
                continue;
            }
            if occurrences.len() >= budget {
                break 'walk;
            }

            let mut occurrence = master.clone();
            occurrence.start = day;
            occurrence.end = day.checked_add_signed(duration).unwrap_or(day);
            occurrence.sequence = u32::try_from(occurrences.len() + 1).unwrap_or(u32::MAX);
            occurrence.refresh_id();
            occurrences.push(occurrence);
            last_emitted = day;
        }
    }

    debug!(
        uid = %master.imported_id,
        generated = occurrences.len(),
        budget,
        "Expanded recurring event"
    );

    occurrences
}
