//! Day agenda and upcoming-events views over a snapshot of records.
//!
//! [`active_on`] decides which records appear on a calendar date. Dates are
//! UTC calendar days; a record spans the UTC days of its start and end
//! instants.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::error::Result;
use crate::occurrence::next_occurrence;
use crate::record::{sort_by_start, ScheduleRecord};

/// Whether `record` belongs on the agenda for `date`.
///
/// - Outside `[start_date, end_date]` a record is never active.
/// - A non-repeating record is active only on its start date, even when its
///   end instant falls on a later day.
/// - A repeating record is active when the weekday of `date` is one of its
///   repeat days.
pub fn is_active_on(date: NaiveDate, record: &ScheduleRecord) -> bool {
    let start_date = record.start_date();
    if date < start_date || date > record.end_date() {
        return false;
    }
    if record.repeat_days.is_empty() {
        return date == start_date;
    }
    record.repeat_days.contains(date.weekday())
}

/// The records active on `date`, in input order.
pub fn active_on(date: NaiveDate, records: &[ScheduleRecord]) -> Vec<&ScheduleRecord> {
    records.iter().filter(|r| is_active_on(date, r)).collect()
}

/// The agenda for `date`, ordered by start instant.
pub fn agenda_for(date: NaiveDate, records: &[ScheduleRecord]) -> Vec<ScheduleRecord> {
    let mut sorted = records.to_vec();
    sort_by_start(&mut sorted);
    sorted.retain(|r| is_active_on(date, r));
    sorted
}

/// A record paired with its next pending slot.
#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingEvent {
    pub record: ScheduleRecord,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Records that still have a slot ending after `now`, soonest first.
///
/// Ties on the slot start keep the earlier record start first. `limit`
/// truncates the list when given.
pub fn upcoming(
    now: DateTime<Utc>,
    records: &[ScheduleRecord],
    limit: Option<usize>,
) -> Result<Vec<UpcomingEvent>> {
    let mut events = Vec::new();
    for record in records {
        if let Some(slot) = next_occurrence(record, now)? {
            events.push(UpcomingEvent {
                record: record.clone(),
                start: slot.start,
                end: slot.end,
            });
        }
    }

    events.sort_by_key(|e| (e.start, e.record.start_date_time));
    if let Some(limit) = limit {
        events.truncate(limit);
    }
    Ok(events)
}
