//! Occurrence expansion -- turns a schedule record into concrete time slots.
//!
//! A recurring record produces one slot on every date between its start and
//! end dates (inclusive, UTC) whose weekday is in `repeat_days`, running from
//! the start time-of-day to the end time-of-day. A one-off record is its own
//! single slot.
//!
//! Weekly recurrences are expanded through the `rrule` crate from the rule
//! returned by [`recurrence_rule`].

use chrono::{DateTime, Datelike, Duration, Utc};
use log::trace;
use rrule::RRuleSet;

use crate::error::{Result, ScheduleError};
use crate::record::ScheduleRecord;
use crate::time::utc_date;

/// Upper bound on instances produced by a single expansion.
const MAX_INSTANCES: u16 = 500;

/// A single concrete slot of a schedule record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// RFC 5545 RRULE for a recurring record, e.g.
/// `FREQ=WEEKLY;BYDAY=MO,WE;UNTIL=20240630T235959Z`.
///
/// Returns `None` for a non-repeating record.
pub fn recurrence_rule(record: &ScheduleRecord) -> Option<String> {
    if !record.is_recurring() {
        return None;
    }
    Some(format!(
        "FREQ=WEEKLY;BYDAY={};UNTIL={}T235959Z",
        record.repeat_days.byday(),
        record.end_date().format("%Y%m%d")
    ))
}

/// Length of each slot of a recurring record: the time-of-day span from start
/// to end, wrapping past midnight when the end time is not after the start.
fn slot_length(record: &ScheduleRecord) -> Duration {
    let span = record.end_date_time.time() - record.start_date_time.time();
    if span > Duration::zero() {
        span
    } else {
        span + Duration::days(1)
    }
}

/// Expand `record` into the slots that overlap `[window_start, window_end)`.
///
/// Slots come back in chronological order.
///
/// # Errors
/// Returns `ScheduleError::InvalidRule` if the generated rule is rejected by
/// the recurrence parser.
pub fn occurrences(
    record: &ScheduleRecord,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Result<Vec<Occurrence>> {
    if window_start >= window_end {
        return Ok(Vec::new());
    }

    let rule = match recurrence_rule(record) {
        Some(rule) => rule,
        None => {
            let slot = Occurrence {
                start: record.start_date_time,
                end: record.end_date_time,
            };
            return Ok(if slot.start < window_end && slot.end > window_start {
                vec![slot]
            } else {
                Vec::new()
            });
        }
    };

    let rrule_text = format!(
        "DTSTART:{}\nRRULE:{}",
        record.start_date_time.format("%Y%m%dT%H%M%SZ"),
        rule
    );
    let rrule_set: RRuleSet = rrule_text.parse().map_err(|e| {
        ScheduleError::InvalidRule(format!("schedule '{}': {}", record.id, e))
    })?;

    let length = slot_length(record);

    // A slot starting up to `length` before the window can still reach into
    // it. `after`/`before` are exclusive, so widen each side by a second.
    let tz = rrule::Tz::UTC;
    let after = (window_start - length - Duration::seconds(1)).with_timezone(&tz);
    let before = (window_end + Duration::seconds(1)).with_timezone(&tz);

    let result = rrule_set.after(after).before(before).all(MAX_INSTANCES);
    if result.limited {
        trace!(
            "expansion of schedule {} capped at {} instances",
            record.id,
            MAX_INSTANCES
        );
    }

    let first_date = record.start_date();
    let last_date = record.end_date();

    let slots = result
        .dates
        .into_iter()
        .map(|dt| dt.with_timezone(&Utc))
        // The recurrence set may also yield DTSTART itself; keep only dates
        // the record is actually active on.
        .filter(|start| {
            let date = utc_date(*start);
            date >= first_date && date <= last_date && record.repeat_days.contains(date.weekday())
        })
        .map(|start| Occurrence {
            start,
            end: start + length,
        })
        .filter(|slot| slot.start < window_end && slot.end > window_start)
        .collect();

    Ok(slots)
}

/// The first slot of `record` that has not finished by `now`.
pub fn next_occurrence(record: &ScheduleRecord, now: DateTime<Utc>) -> Result<Option<Occurrence>> {
    // Slots of the last active date may run past midnight.
    let horizon = record.end_date_time + Duration::days(2);
    Ok(occurrences(record, now, horizon)?.into_iter().next())
}
