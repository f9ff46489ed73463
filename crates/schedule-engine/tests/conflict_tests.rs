//! Tests for schedule conflict detection.

use chrono::{DateTime, TimeZone, Utc};
use schedule_engine::conflict::{overlaps, recurrence_compatible};
use schedule_engine::{find_conflict, find_conflicts, has_conflict};
use schedule_engine::{CandidateInterval, RepeatDays, ScheduleRecord};

fn at(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, 0).unwrap()
}

fn days(indices: &[u8]) -> RepeatDays {
    RepeatDays::from_indices(indices.iter().copied()).unwrap()
}

/// Helper to create a stored record from a time range and repeat days.
fn record(id: &str, start: DateTime<Utc>, end: DateTime<Utc>, repeat: &[u8]) -> ScheduleRecord {
    ScheduleRecord {
        id: id.to_string(),
        owner_id: "student-1".to_string(),
        title: format!("Class {}", id),
        description: "Lecture".to_string(),
        location: "Hall A".to_string(),
        start_date_time: start,
        end_date_time: end,
        repeat_days: days(repeat),
    }
}

fn candidate(start: DateTime<Utc>, end: DateTime<Utc>, repeat: &[u8]) -> CandidateInterval {
    CandidateInterval::new(start, end, days(repeat))
}

// ---------------------------------------------------------------------------
// One-off vs one-off
// ---------------------------------------------------------------------------

#[test]
fn overlapping_one_off_events_conflict() {
    // A: 09:00-10:00, B: 09:30-10:30 on 2024-06-03
    let a = record("a", at(2024, 6, 3, 9, 0), at(2024, 6, 3, 10, 0), &[]);
    let b = candidate(at(2024, 6, 3, 9, 30), at(2024, 6, 3, 10, 30), &[]);

    assert!(has_conflict(&b, &[a]));
}

#[test]
fn disjoint_one_off_events_do_not_conflict() {
    let a = record("a", at(2024, 6, 3, 9, 0), at(2024, 6, 3, 10, 0), &[]);
    let b = candidate(at(2024, 6, 3, 11, 0), at(2024, 6, 3, 12, 0), &[]);

    assert!(!has_conflict(&b, &[a]));
}

#[test]
fn touching_endpoints_are_not_a_conflict() {
    let a = record("a", at(2024, 6, 3, 9, 0), at(2024, 6, 3, 10, 0), &[]);
    let after = candidate(at(2024, 6, 3, 10, 0), at(2024, 6, 3, 11, 0), &[]);
    let before = candidate(at(2024, 6, 3, 8, 0), at(2024, 6, 3, 9, 0), &[]);

    assert!(!has_conflict(&after, std::slice::from_ref(&a)));
    assert!(!has_conflict(&before, &[a]));
}

#[test]
fn contained_event_conflicts() {
    let a = record("a", at(2024, 6, 3, 9, 0), at(2024, 6, 3, 12, 0), &[]);
    let b = candidate(at(2024, 6, 3, 10, 0), at(2024, 6, 3, 11, 0), &[]);

    assert!(has_conflict(&b, &[a]));
}

#[test]
fn empty_existing_list_never_conflicts() {
    let b = candidate(at(2024, 6, 3, 10, 0), at(2024, 6, 3, 11, 0), &[]);
    assert!(!has_conflict(&b, &[]));
    assert!(find_conflict(&b, &[]).is_none());
}

// ---------------------------------------------------------------------------
// Recurring vs recurring
// ---------------------------------------------------------------------------

#[test]
fn recurring_without_shared_weekday_do_not_conflict() {
    // A repeats Monday, C repeats Tuesday; their ranges overlap in time.
    let a = record("a", at(2024, 6, 3, 9, 0), at(2024, 6, 30, 10, 0), &[1]);
    let c = candidate(at(2024, 6, 10, 9, 30), at(2024, 6, 20, 10, 0), &[2]);

    assert!(!has_conflict(&c, &[a]));
}

#[test]
fn monday_class_vs_tuesday_slot_next_week() {
    let a = record("a", at(2024, 6, 3, 9, 0), at(2024, 6, 3, 10, 0), &[1]);
    let c = candidate(at(2024, 6, 10, 9, 30), at(2024, 6, 10, 10, 0), &[2]);

    assert!(!has_conflict(&c, &[a]));
}

#[test]
fn recurring_with_shared_weekday_conflict() {
    let a = record("a", at(2024, 6, 3, 9, 0), at(2024, 6, 30, 10, 0), &[1, 3]);
    let c = candidate(at(2024, 6, 10, 9, 30), at(2024, 6, 20, 10, 0), &[3, 5]);

    assert!(has_conflict(&c, &[a]));
}

#[test]
fn recurring_with_shared_weekday_but_disjoint_ranges_do_not_conflict() {
    let a = record("a", at(2024, 6, 3, 9, 0), at(2024, 6, 14, 10, 0), &[1]);
    let c = candidate(at(2024, 7, 1, 9, 0), at(2024, 7, 31, 10, 0), &[1]);

    assert!(!has_conflict(&c, &[a]));
}

// ---------------------------------------------------------------------------
// Mixed one-off / recurring: never compatible
// ---------------------------------------------------------------------------

#[test]
fn one_off_candidate_ignores_recurring_record() {
    let a = record("a", at(2024, 6, 3, 9, 0), at(2024, 6, 30, 10, 0), &[1]);
    let b = candidate(at(2024, 6, 10, 9, 0), at(2024, 6, 10, 10, 0), &[]);

    assert!(!has_conflict(&b, &[a]));
}

#[test]
fn recurring_candidate_ignores_one_off_record() {
    let a = record("a", at(2024, 6, 10, 9, 0), at(2024, 6, 10, 10, 0), &[]);
    let c = candidate(at(2024, 6, 3, 9, 0), at(2024, 6, 30, 10, 0), &[1]);

    assert!(!has_conflict(&c, &[a]));
}

#[test]
fn compatibility_table() {
    let one_off = record("a", at(2024, 6, 3, 9, 0), at(2024, 6, 3, 10, 0), &[]);
    let monday = record("b", at(2024, 6, 3, 9, 0), at(2024, 6, 30, 10, 0), &[1]);
    let start = at(2024, 6, 3, 9, 0);
    let end = at(2024, 6, 3, 10, 0);

    assert!(recurrence_compatible(&candidate(start, end, &[]), &one_off));
    assert!(!recurrence_compatible(&candidate(start, end, &[]), &monday));
    assert!(!recurrence_compatible(&candidate(start, end, &[1]), &one_off));
    assert!(recurrence_compatible(&candidate(start, end, &[1, 2]), &monday));
    assert!(!recurrence_compatible(&candidate(start, end, &[2]), &monday));
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

#[test]
fn find_conflict_returns_first_match_in_order() {
    let existing = vec![
        record("a", at(2024, 6, 3, 8, 0), at(2024, 6, 3, 9, 0), &[]),
        record("b", at(2024, 6, 3, 9, 0), at(2024, 6, 3, 10, 0), &[]),
        record("c", at(2024, 6, 3, 9, 30), at(2024, 6, 3, 11, 0), &[]),
    ];
    let cand = candidate(at(2024, 6, 3, 9, 15), at(2024, 6, 3, 9, 45), &[]);

    let hit = find_conflict(&cand, &existing).expect("should conflict");
    assert_eq!(hit.id, "b");
}

#[test]
fn find_conflicts_reports_overlap_minutes() {
    let existing = vec![
        record("a", at(2024, 6, 3, 9, 0), at(2024, 6, 3, 10, 0), &[]),
        record("b", at(2024, 6, 3, 13, 0), at(2024, 6, 3, 14, 0), &[]),
        record("c", at(2024, 6, 3, 9, 45), at(2024, 6, 3, 12, 0), &[]),
    ];
    let cand = candidate(at(2024, 6, 3, 9, 30), at(2024, 6, 3, 10, 30), &[]);

    let conflicts = find_conflicts(&cand, &existing);

    assert_eq!(conflicts.len(), 2);
    assert_eq!(conflicts[0].existing.id, "a");
    assert_eq!(conflicts[0].overlap_minutes, 30);
    assert_eq!(conflicts[1].existing.id, "c");
    assert_eq!(conflicts[1].overlap_minutes, 45);
}

#[test]
fn overlap_is_half_open() {
    let nine = at(2024, 6, 3, 9, 0);
    let ten = at(2024, 6, 3, 10, 0);
    let eleven = at(2024, 6, 3, 11, 0);

    assert!(!overlaps(nine, ten, ten, eleven));
    assert!(overlaps(nine, eleven, ten, eleven));
}
