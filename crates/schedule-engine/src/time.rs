//! Parsing of instants and calendar dates crossing the storage boundary.
//!
//! Instants are ISO 8601 and always normalised to UTC. Calendar dates are
//! `YYYY-MM-DD` and denote UTC days.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

use crate::error::{Result, ScheduleError};
use crate::repeat::weekday_index;

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parse an ISO 8601 datetime string into `DateTime<Utc>`.
///
/// Accepts RFC 3339 with any offset (e.g., "2024-06-03T09:00:00.000Z",
/// "2024-06-03T11:00:00+02:00") and naive datetimes, which are taken as UTC.
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    parse_naive(s)
        .map(|ndt| ndt.and_utc())
        .ok_or_else(|| ScheduleError::InvalidInstant(s.to_string()))
}

/// Parse a naive local datetime (no offset), as typed into a form.
pub fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s.trim(), fmt).ok())
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_calendar_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ScheduleError::InvalidDate(s.to_string()))
}

/// The UTC calendar day an instant falls on.
pub fn utc_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.date_naive()
}

/// Sunday-based weekday index of a calendar date.
pub fn date_weekday_index(date: NaiveDate) -> u8 {
    weekday_index(date.weekday())
}
