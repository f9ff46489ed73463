//! Schedule records and the shapes used to create and patch them.
//!
//! Field names serialize in camelCase so records round-trip with the
//! documents the mobile client stores (`ownerId`, `startDateTime`, ...).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::repeat::RepeatDays;
use crate::time::utc_date;

/// One persisted calendar entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRecord {
    /// Assigned by the store on creation.
    pub id: String,
    /// Owning user. Never changes after creation.
    pub owner_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    /// Weekdays the record repeats on between its start and end dates.
    #[serde(default)]
    pub repeat_days: RepeatDays,
}

impl ScheduleRecord {
    /// Build a record from a draft. Stores call this once they have an id.
    pub fn from_draft(
        id: impl Into<String>,
        owner_id: impl Into<String>,
        draft: ScheduleDraft,
    ) -> Self {
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            title: draft.title,
            description: draft.description,
            location: draft.location,
            start_date_time: draft.start_date_time,
            end_date_time: draft.end_date_time,
            repeat_days: draft.repeat_days,
        }
    }

    pub fn is_recurring(&self) -> bool {
        !self.repeat_days.is_empty()
    }

    /// UTC calendar day of the start instant.
    pub fn start_date(&self) -> NaiveDate {
        utc_date(self.start_date_time)
    }

    /// UTC calendar day of the end instant.
    pub fn end_date(&self) -> NaiveDate {
        utc_date(self.end_date_time)
    }

    /// The record's time range and repeat flags, as a conflict candidate.
    pub fn interval(&self) -> CandidateInterval {
        CandidateInterval {
            start_date_time: self.start_date_time,
            end_date_time: self.end_date_time,
            repeat_days: self.repeat_days,
        }
    }

    /// Apply a partial update in place. `id` and `owner_id` are untouched.
    pub fn apply(&mut self, patch: SchedulePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(start) = patch.start_date_time {
            self.start_date_time = start;
        }
        if let Some(end) = patch.end_date_time {
            self.end_date_time = end;
        }
        if let Some(days) = patch.repeat_days {
            self.repeat_days = days;
        }
    }

    /// Check the record still satisfies what creation required: non-blank
    /// title, description and location, and a start strictly before the end.
    pub fn validate(&self) -> Result<()> {
        check_fields(
            &self.title,
            &self.description,
            &self.location,
            self.start_date_time,
            self.end_date_time,
        )
    }

    /// Parse a JSON array of records.
    pub fn list_from_json(json: &str) -> Result<Vec<ScheduleRecord>> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A time range with repeat flags that has not been persisted yet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateInterval {
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    #[serde(default)]
    pub repeat_days: RepeatDays,
}

impl CandidateInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, repeat_days: RepeatDays) -> Self {
        Self {
            start_date_time: start,
            end_date_time: end,
            repeat_days,
        }
    }
}

/// The user-supplied fields of a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    #[serde(default)]
    pub repeat_days: RepeatDays,
}

impl ScheduleDraft {
    pub fn candidate(&self) -> CandidateInterval {
        CandidateInterval::new(self.start_date_time, self.end_date_time, self.repeat_days)
    }

    /// Check the fields the creation form requires.
    ///
    /// Title, description and location must be non-blank, and the start must
    /// come strictly before the end.
    pub fn validate(&self) -> Result<()> {
        check_fields(
            &self.title,
            &self.description,
            &self.location,
            self.start_date_time,
            self.end_date_time,
        )
    }
}

fn check_fields(
    title: &str,
    description: &str,
    location: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<()> {
    if title.trim().is_empty() {
        return Err(ScheduleError::MissingField("title"));
    }
    if description.trim().is_empty() {
        return Err(ScheduleError::MissingField("description"));
    }
    if location.trim().is_empty() {
        return Err(ScheduleError::MissingField("location"));
    }
    if start >= end {
        return Err(ScheduleError::InvalidInterval { start, end });
    }
    Ok(())
}

/// Partial update of a record. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date_time: Option<DateTime<Utc>>,
    pub end_date_time: Option<DateTime<Utc>>,
    pub repeat_days: Option<RepeatDays>,
}

impl SchedulePatch {
    pub fn is_empty(&self) -> bool {
        *self == SchedulePatch::default()
    }
}

/// Sort records by start instant, keeping the relative order of equal starts.
pub fn sort_by_start(records: &mut [ScheduleRecord]) {
    records.sort_by_key(|r| r.start_date_time);
}
