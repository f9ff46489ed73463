//! Tests for the in-memory store and the planner workflows built on it.

use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use chrono::{DateTime, TimeZone, Utc};
use schedule_engine::{
    parse_calendar_date, MemoryStore, Planner, RepeatDays, ScheduleDraft, ScheduleError,
    SchedulePatch, ScheduleRecord, ScheduleStore,
};

fn at(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, 0).unwrap()
}

fn draft(title: &str, start: DateTime<Utc>, end: DateTime<Utc>, repeat: &[u8]) -> ScheduleDraft {
    ScheduleDraft {
        title: title.to_string(),
        description: "Lecture".to_string(),
        location: "Hall A".to_string(),
        start_date_time: start,
        end_date_time: end,
        repeat_days: RepeatDays::from_indices(repeat.iter().copied()).unwrap(),
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[test]
fn list_is_owner_scoped_and_sorted() {
    let store = MemoryStore::new();
    store
        .create("alice", draft("Late", at(2024, 6, 3, 15, 0), at(2024, 6, 3, 16, 0), &[]))
        .unwrap();
    store
        .create("bob", draft("Other", at(2024, 6, 3, 9, 0), at(2024, 6, 3, 10, 0), &[]))
        .unwrap();
    store
        .create("alice", draft("Early", at(2024, 6, 3, 8, 0), at(2024, 6, 3, 9, 0), &[]))
        .unwrap();

    let titles: Vec<String> = store
        .list("alice")
        .unwrap()
        .into_iter()
        .map(|r| r.title)
        .collect();
    assert_eq!(titles, vec!["Early", "Late"]);
}

#[test]
fn created_records_get_distinct_ids() {
    let store = MemoryStore::new();
    let a = store
        .create("alice", draft("A", at(2024, 6, 3, 8, 0), at(2024, 6, 3, 9, 0), &[]))
        .unwrap();
    let b = store
        .create("alice", draft("B", at(2024, 6, 3, 10, 0), at(2024, 6, 3, 11, 0), &[]))
        .unwrap();

    assert_ne!(a.id, b.id);
    assert_eq!(a.owner_id, "alice");
    assert_eq!(store.get(&b.id).unwrap(), b);
}

#[test]
fn update_replace_and_delete() {
    let store = MemoryStore::new();
    let created = store
        .create("alice", draft("A", at(2024, 6, 3, 8, 0), at(2024, 6, 3, 9, 0), &[]))
        .unwrap();

    let updated = store
        .update(
            &created.id,
            SchedulePatch {
                location: Some("Room 7".to_string()),
                ..SchedulePatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.location, "Room 7");
    assert_eq!(updated.title, "A");

    let replaced = store
        .replace(
            &created.id,
            draft("B", at(2024, 6, 4, 8, 0), at(2024, 6, 4, 9, 0), &[]),
        )
        .unwrap();
    assert_eq!(replaced.id, created.id);
    assert_eq!(replaced.owner_id, "alice");
    assert_eq!(replaced.title, "B");

    store.delete(&created.id).unwrap();
    assert!(matches!(
        store.get(&created.id),
        Err(ScheduleError::NotFound(_))
    ));
    assert!(matches!(
        store.delete(&created.id),
        Err(ScheduleError::NotFound(_))
    ));
}

#[test]
fn store_refuses_writes_that_break_the_interval() {
    let store = MemoryStore::new();
    let created = store
        .create("alice", draft("A", at(2024, 6, 3, 9, 0), at(2024, 6, 3, 10, 0), &[]))
        .unwrap();

    let backwards = SchedulePatch {
        end_date_time: Some(at(2024, 6, 3, 8, 0)),
        ..SchedulePatch::default()
    };
    assert!(matches!(
        store.update(&created.id, backwards),
        Err(ScheduleError::InvalidInterval { .. })
    ));
    assert!(matches!(
        store.replace(&created.id, draft("B", at(2024, 6, 4, 9, 0), at(2024, 6, 4, 9, 0), &[])),
        Err(ScheduleError::InvalidInterval { .. })
    ));
    assert!(matches!(
        store.create("alice", draft(" ", at(2024, 6, 4, 9, 0), at(2024, 6, 4, 10, 0), &[])),
        Err(ScheduleError::MissingField("title"))
    ));

    assert_eq!(store.list("alice").unwrap(), vec![created]);
}

#[test]
fn subscribers_receive_snapshots_for_their_owner() {
    let store = MemoryStore::new();
    let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&seen);
    let sub = store
        .subscribe(
            "alice",
            Arc::new(move |records: &[ScheduleRecord]| {
                sink.lock().unwrap().push(records.len());
            }),
        )
        .unwrap();

    let a = store
        .create("alice", draft("A", at(2024, 6, 3, 8, 0), at(2024, 6, 3, 9, 0), &[]))
        .unwrap();
    store
        .create("bob", draft("B", at(2024, 6, 3, 8, 0), at(2024, 6, 3, 9, 0), &[]))
        .unwrap();
    store.delete(&a.id).unwrap();

    store.unsubscribe(sub).unwrap();
    store
        .create("alice", draft("C", at(2024, 6, 3, 8, 0), at(2024, 6, 3, 9, 0), &[]))
        .unwrap();

    // Initial snapshot, create, delete. Bob's record and post-unsubscribe
    // changes are not delivered.
    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 0]);
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

#[test]
fn add_rejects_clash_and_names_existing_record() {
    let planner = Planner::new(MemoryStore::new());
    let first = planner
        .add("alice", draft("Maths", at(2024, 6, 3, 9, 0), at(2024, 6, 3, 10, 0), &[]))
        .unwrap();

    let err = planner
        .add("alice", draft("Physics", at(2024, 6, 3, 9, 30), at(2024, 6, 3, 10, 30), &[]))
        .unwrap_err();

    match err {
        ScheduleError::Conflict { id, title } => {
            assert_eq!(id, first.id);
            assert_eq!(title, "Maths");
        }
        other => panic!("expected conflict, got {:?}", other),
    }
    assert_eq!(planner.store().list("alice").unwrap().len(), 1);
}

#[test]
fn add_only_checks_the_same_owner() {
    let planner = Planner::new(MemoryStore::new());
    planner
        .add("alice", draft("Maths", at(2024, 6, 3, 9, 0), at(2024, 6, 3, 10, 0), &[]))
        .unwrap();

    let same_slot = draft("Maths", at(2024, 6, 3, 9, 0), at(2024, 6, 3, 10, 0), &[]);
    let result = planner.add("bob", same_slot);

    assert!(result.is_ok());
}

#[test]
fn add_validates_before_touching_the_store() {
    let planner = Planner::new(MemoryStore::new());

    let mut missing_location = draft("Maths", at(2024, 6, 3, 9, 0), at(2024, 6, 3, 10, 0), &[]);
    missing_location.location = String::new();
    assert!(matches!(
        planner.add("alice", missing_location),
        Err(ScheduleError::MissingField("location"))
    ));

    let backwards = draft("Maths", at(2024, 6, 3, 10, 0), at(2024, 6, 3, 9, 0), &[]);
    assert!(matches!(
        planner.add("alice", backwards),
        Err(ScheduleError::InvalidInterval { .. })
    ));

    assert!(planner.store().list("alice").unwrap().is_empty());
}

#[test]
fn agenda_reads_through_the_store() {
    let planner = Planner::new(MemoryStore::new());
    planner
        .add("alice", draft("Seminar", at(2024, 6, 3, 14, 0), at(2024, 6, 3, 15, 0), &[]))
        .unwrap();
    planner
        .add("alice", draft("Weekly", at(2024, 6, 3, 9, 0), at(2024, 6, 30, 10, 0), &[1]))
        .unwrap();

    let monday = planner
        .agenda("alice", parse_calendar_date("2024-06-03").unwrap())
        .unwrap();
    let titles: Vec<&str> = monday.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Weekly", "Seminar"]);

    let next_monday = planner
        .agenda("alice", parse_calendar_date("2024-06-10").unwrap())
        .unwrap();
    assert_eq!(next_monday.len(), 1);
    assert_eq!(next_monday[0].title, "Weekly");
}

#[test]
fn upcoming_through_planner() {
    let planner = Planner::new(MemoryStore::new());
    planner
        .add("alice", draft("Weekly", at(2024, 6, 3, 9, 0), at(2024, 6, 30, 10, 0), &[1]))
        .unwrap();

    let events = planner.upcoming("alice", at(2024, 6, 4, 0, 0), Some(5)).unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].start, at(2024, 6, 10, 9, 0));
}

#[test]
fn update_keeps_the_record_valid() {
    let planner = Planner::new(MemoryStore::new());
    let created = planner
        .add("alice", draft("Maths", at(2024, 6, 3, 9, 0), at(2024, 6, 3, 10, 0), &[]))
        .unwrap();

    let err = planner
        .update(
            "alice",
            &created.id,
            SchedulePatch {
                title: Some(String::new()),
                end_date_time: Some(at(2024, 6, 3, 8, 0)),
                ..SchedulePatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ScheduleError::MissingField("title")));

    let err = planner
        .update(
            "alice",
            &created.id,
            SchedulePatch {
                end_date_time: Some(at(2024, 6, 3, 8, 0)),
                ..SchedulePatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidInterval { .. }));

    assert_eq!(planner.store().get(&created.id).unwrap(), created);

    let moved = planner
        .update(
            "alice",
            &created.id,
            SchedulePatch {
                end_date_time: Some(at(2024, 6, 3, 11, 0)),
                ..SchedulePatch::default()
            },
        )
        .unwrap();
    assert_eq!(moved.end_date_time, at(2024, 6, 3, 11, 0));
}

#[test]
fn update_and_delete_are_owner_scoped() {
    let planner = Planner::new(MemoryStore::new());
    let created = planner
        .add("alice", draft("Maths", at(2024, 6, 3, 9, 0), at(2024, 6, 3, 10, 0), &[]))
        .unwrap();
    let rename = SchedulePatch {
        title: Some("Hijacked".to_string()),
        ..SchedulePatch::default()
    };

    assert!(matches!(
        planner.update("bob", &created.id, rename),
        Err(ScheduleError::NotFound(_))
    ));
    assert!(matches!(
        planner.delete("bob", &created.id),
        Err(ScheduleError::NotFound(_))
    ));
    assert_eq!(planner.store().get(&created.id).unwrap(), created);

    planner.delete("alice", &created.id).unwrap();
    assert!(planner.store().list("alice").unwrap().is_empty());
}

#[test]
fn concurrent_adds_of_the_same_slot_keep_one() {
    let store = MemoryStore::new();
    let writers = 8;
    let barrier = Arc::new(Barrier::new(writers));

    let handles: Vec<_> = (0..writers)
        .map(|i| {
            let planner = Planner::new(store.clone());
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let title = format!("Slot {}", i);
                let slot = draft(&title, at(2024, 6, 3, 9, 0), at(2024, 6, 3, 10, 0), &[]);
                planner.add("alice", slot).is_ok()
            })
        })
        .collect();

    let accepted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(accepted, 1);
    assert_eq!(store.list("alice").unwrap().len(), 1);
}
