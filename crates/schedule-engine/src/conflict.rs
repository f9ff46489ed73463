//! Detect schedule conflicts before a new record is persisted.
//!
//! A candidate conflicts with an existing record when their time ranges
//! overlap and their repeat patterns are compatible. Adjacent ranges (one ends
//! exactly when the other starts) are NOT conflicts.
//!
//! Recurrence compatibility:
//!
//! | candidate | existing  | compatible when          |
//! |-----------|-----------|--------------------------|
//! | one-off   | one-off   | always                   |
//! | recurring | recurring | weekday sets intersect   |
//! | one-off   | recurring | never                    |
//! | recurring | one-off   | never                    |
//!
//! The mixed rows never conflict. That mirrors how records were checked
//! historically; whether a one-off should block a recurring slot on a shared
//! weekday is unresolved, so existing data is judged the same way.

use chrono::{DateTime, Utc};
use log::debug;

use crate::record::{CandidateInterval, ScheduleRecord};

/// A detected conflict between a candidate and an existing record.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict<'a> {
    pub existing: &'a ScheduleRecord,
    pub overlap_minutes: i64,
}

/// Half-open interval overlap: `a.start < b.end && a.end > b.start`.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Whether the repeat flags of two entries allow them to share a day.
pub fn recurrence_compatible(candidate: &CandidateInterval, existing: &ScheduleRecord) -> bool {
    match (
        candidate.repeat_days.is_empty(),
        existing.repeat_days.is_empty(),
    ) {
        (true, true) => true,
        (false, false) => candidate.repeat_days.intersects(&existing.repeat_days),
        _ => false,
    }
}

fn conflicts_with(candidate: &CandidateInterval, existing: &ScheduleRecord) -> bool {
    overlaps(
        candidate.start_date_time,
        candidate.end_date_time,
        existing.start_date_time,
        existing.end_date_time,
    ) && recurrence_compatible(candidate, existing)
}

/// True if `candidate` conflicts with any record in `existing`.
///
/// `existing` must already be scoped to the candidate's owner. Stops at the
/// first conflicting record.
pub fn has_conflict(candidate: &CandidateInterval, existing: &[ScheduleRecord]) -> bool {
    find_conflict(candidate, existing).is_some()
}

/// The first record in `existing` that conflicts with `candidate`.
pub fn find_conflict<'a>(
    candidate: &CandidateInterval,
    existing: &'a [ScheduleRecord],
) -> Option<&'a ScheduleRecord> {
    let hit = existing.iter().find(|e| conflicts_with(candidate, e));
    if let Some(e) = hit {
        debug!(
            "candidate {}..{} conflicts with schedule {}",
            candidate.start_date_time, candidate.end_date_time, e.id
        );
    }
    hit
}

/// Every record in `existing` that conflicts with `candidate`, in input order.
///
/// The overlap duration is `min(ends) - max(starts)`.
pub fn find_conflicts<'a>(
    candidate: &CandidateInterval,
    existing: &'a [ScheduleRecord],
) -> Vec<Conflict<'a>> {
    existing
        .iter()
        .filter(|e| conflicts_with(candidate, e))
        .map(|e| {
            let overlap_start = candidate.start_date_time.max(e.start_date_time);
            let overlap_end = candidate.end_date_time.min(e.end_date_time);
            Conflict {
                existing: e,
                overlap_minutes: (overlap_end - overlap_start).num_minutes(),
            }
        })
        .collect()
}
