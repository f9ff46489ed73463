//! Workflows that combine a store with the conflict and agenda logic.

use chrono::{DateTime, NaiveDate, Utc};
use log::debug;

use crate::agenda::{self, UpcomingEvent};
use crate::conflict::find_conflict;
use crate::error::{Result, ScheduleError};
use crate::record::{ScheduleDraft, SchedulePatch, ScheduleRecord};
use crate::store::ScheduleStore;

/// Entry point for creating and viewing schedules on top of an injected store.
pub struct Planner<S> {
    store: S,
}

impl<S: ScheduleStore> Planner<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Validate `draft`, reject it if it conflicts with one of `owner`'s
    /// records, and persist it otherwise.
    ///
    /// # Errors
    /// Validation errors from [`ScheduleDraft::validate`],
    /// `ScheduleError::Conflict` naming the first clashing record, or any
    /// store error.
    pub fn add(&self, owner: &str, draft: ScheduleDraft) -> Result<ScheduleRecord> {
        draft.validate()?;

        let candidate = draft.candidate();
        let title = draft.title.clone();
        let reject_clash = |existing: &[ScheduleRecord]| {
            match find_conflict(&candidate, existing) {
                Some(clash) => {
                    debug!("rejecting '{}' for {}: clashes with {}", title, owner, clash.id);
                    Err(ScheduleError::Conflict {
                        id: clash.id.clone(),
                        title: clash.title.clone(),
                    })
                }
                None => Ok(()),
            }
        };

        self.store.create_checked(owner, draft, &reject_clash)
    }

    /// `owner`'s records active on `date`, ordered by start.
    pub fn agenda(&self, owner: &str, date: NaiveDate) -> Result<Vec<ScheduleRecord>> {
        let records = self.store.list(owner)?;
        Ok(agenda::agenda_for(date, &records))
    }

    pub fn upcoming(
        &self,
        owner: &str,
        now: DateTime<Utc>,
        limit: Option<usize>,
    ) -> Result<Vec<UpcomingEvent>> {
        let records = self.store.list(owner)?;
        agenda::upcoming(now, &records, limit)
    }

    /// Patch one of `owner`'s records. Updates are not re-checked for
    /// conflicts, but the patched record must still validate.
    ///
    /// # Errors
    /// `ScheduleError::NotFound` if no record `id` belongs to `owner`,
    /// validation errors for the patched record, or any store error.
    pub fn update(&self, owner: &str, id: &str, patch: SchedulePatch) -> Result<ScheduleRecord> {
        self.owned(owner, id)?;
        self.store.update(id, patch)
    }

    /// Delete one of `owner`'s records.
    pub fn delete(&self, owner: &str, id: &str) -> Result<()> {
        self.owned(owner, id)?;
        self.store.delete(id)
    }

    /// Fetch `id`, treating another owner's record as missing.
    fn owned(&self, owner: &str, id: &str) -> Result<ScheduleRecord> {
        let record = self.store.get(id)?;
        if record.owner_id != owner {
            debug!("{} asked for {}, owned by {}", owner, id, record.owner_id);
            return Err(ScheduleError::NotFound(id.to_string()));
        }
        Ok(record)
    }
}
