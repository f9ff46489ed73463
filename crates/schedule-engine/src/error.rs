//! Error types for schedule-engine operations.
//!
//! The conflict and agenda functions are infallible; these errors come from
//! parsing, validation, occurrence expansion and the store layer.

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Start {start} must be before end {end}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid weekday index {0} (expected 0-6, 0 = Sunday)")]
    InvalidWeekday(u8),

    #[error("Invalid calendar date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Invalid instant '{0}' (expected ISO 8601)")]
    InvalidInstant(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Local time {time} does not exist in {timezone}")]
    NonexistentLocalTime {
        time: NaiveDateTime,
        timezone: String,
    },

    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(String),

    #[error("Schedule overlaps with existing schedule '{title}' ({id})")]
    Conflict { id: String, title: String },

    #[error("Schedule not found: {0}")]
    NotFound(String),

    #[error("Note not found: {0}")]
    NoteNotFound(i64),

    #[error("Store error: {0}")]
    Store(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
