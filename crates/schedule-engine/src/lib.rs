//! # schedule-engine
//!
//! Overlap detection and weekly recurrence matching for a student's class and
//! event schedule.
//!
//! Records carry a UTC time range and an optional set of weekdays they repeat
//! on. The engine answers two questions over a snapshot of an owner's records:
//! does a new entry clash with anything already booked, and what is on the
//! agenda for a given day. Both are pure functions; persistence sits behind the
//! [`ScheduleStore`] trait and is injected into a [`Planner`]. Free-text notes
//! live in a separate [`NoteStore`].
//!
//! ## Modules
//!
//! - [`record`] — `ScheduleRecord`, drafts, patches, candidates
//! - [`repeat`] — `RepeatDays` weekday set (0 = Sunday)
//! - [`conflict`] — Detect clashes between a candidate and existing records
//! - [`agenda`] — Records active on a date, upcoming dashboard
//! - [`occurrence`] — Expand recurring records into concrete slots
//! - [`time`] — ISO 8601 instant and calendar-date parsing
//! - [`dst`] — Wall-clock to UTC normalisation with DST policies
//! - [`store`] — Store contract and in-memory store
//! - [`note`] — Free-text notes and their store
//! - [`planner`] — Create/agenda workflows over a store
//! - [`error`] — Error types

pub mod agenda;
pub mod conflict;
pub mod dst;
pub mod error;
pub mod note;
pub mod occurrence;
pub mod planner;
pub mod record;
pub mod repeat;
pub mod store;
pub mod time;

pub use agenda::{active_on, agenda_for, upcoming, UpcomingEvent};
pub use conflict::{find_conflict, find_conflicts, has_conflict, Conflict};
pub use dst::{local_to_utc, DstPolicy};
pub use error::ScheduleError;
pub use note::{MemoryNoteStore, Note, NoteStore};
pub use occurrence::{next_occurrence, occurrences, recurrence_rule, Occurrence};
pub use planner::Planner;
pub use record::{CandidateInterval, ScheduleDraft, SchedulePatch, ScheduleRecord};
pub use repeat::RepeatDays;
pub use store::{Listener, MemoryStore, ScheduleStore, SubscriptionId};
pub use time::{parse_calendar_date, parse_instant};
