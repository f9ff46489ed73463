//! The schedule store contract and an in-memory implementation.
//!
//! A store persists records keyed by owner and hands out owner-scoped
//! snapshots. Subscribers get the full sorted snapshot of an owner's records
//! on subscription and after every change to them.
//!
//! Every write is validated: a stored record always has non-blank text
//! fields and a start strictly before its end.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;
use uuid::Uuid;

use crate::error::{Result, ScheduleError};
use crate::record::{sort_by_start, ScheduleDraft, SchedulePatch, ScheduleRecord};

/// Handle returned by [`ScheduleStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Callback receiving an owner's records, sorted by start.
pub type Listener = Arc<dyn Fn(&[ScheduleRecord]) + Send + Sync>;

pub trait ScheduleStore {
    /// Persist a new record for `owner`, assigning its id.
    fn create(&self, owner: &str, draft: ScheduleDraft) -> Result<ScheduleRecord>;

    /// Persist a new record only if `check` accepts `owner`'s current
    /// records. The check and the insert are one step with respect to other
    /// writers. `check` must not call back into the store.
    fn create_checked(
        &self,
        owner: &str,
        draft: ScheduleDraft,
        check: &dyn Fn(&[ScheduleRecord]) -> Result<()>,
    ) -> Result<ScheduleRecord>;

    /// All of `owner`'s records, sorted by start instant.
    fn list(&self, owner: &str) -> Result<Vec<ScheduleRecord>>;

    fn get(&self, id: &str) -> Result<ScheduleRecord>;

    /// Apply a partial update. The patched record must still validate.
    fn update(&self, id: &str, patch: SchedulePatch) -> Result<ScheduleRecord>;

    /// Replace every user-editable field of a record.
    fn replace(&self, id: &str, draft: ScheduleDraft) -> Result<ScheduleRecord>;

    fn delete(&self, id: &str) -> Result<()>;

    /// Register `listener` for changes to `owner`'s records. It is called
    /// once immediately with the current snapshot.
    fn subscribe(&self, owner: &str, listener: Listener) -> Result<SubscriptionId>;

    fn unsubscribe(&self, id: SubscriptionId) -> Result<()>;
}

#[derive(Default)]
struct MemoryState {
    records: Vec<ScheduleRecord>,
    listeners: HashMap<SubscriptionId, (String, Listener)>,
    next_subscription: u64,
}

impl MemoryState {
    fn snapshot(&self, owner: &str) -> Vec<ScheduleRecord> {
        let mut records: Vec<ScheduleRecord> = self
            .records
            .iter()
            .filter(|r| r.owner_id == owner)
            .cloned()
            .collect();
        sort_by_start(&mut records);
        records
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| ScheduleError::NotFound(id.to_string()))
    }

    fn listeners_for(&self, owner: &str) -> Vec<Listener> {
        self.listeners
            .values()
            .filter(|(o, _)| o == owner)
            .map(|(_, l)| Arc::clone(l))
            .collect()
    }
}

/// Thread-safe in-memory store. Cloning shares the underlying state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with existing records.
    pub fn with_records(records: Vec<ScheduleRecord>) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.lock() {
            state.records = records;
        }
        store
    }

    /// Every stored record across all owners, in insertion order.
    pub fn all_records(&self) -> Result<Vec<ScheduleRecord>> {
        Ok(self.lock()?.records.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| ScheduleError::Store("memory store lock poisoned".to_string()))
    }

    /// Deliver the owner's snapshot to its listeners, outside the lock.
    fn notify(&self, owner: &str) -> Result<()> {
        let (snapshot, listeners) = {
            let state = self.lock()?;
            (state.snapshot(owner), state.listeners_for(owner))
        };
        for listener in listeners {
            listener(&snapshot);
        }
        Ok(())
    }
}

impl ScheduleStore for MemoryStore {
    fn create(&self, owner: &str, draft: ScheduleDraft) -> Result<ScheduleRecord> {
        self.create_checked(owner, draft, &|_| Ok(()))
    }

    fn create_checked(
        &self,
        owner: &str,
        draft: ScheduleDraft,
        check: &dyn Fn(&[ScheduleRecord]) -> Result<()>,
    ) -> Result<ScheduleRecord> {
        draft.validate()?;
        let record = {
            let mut state = self.lock()?;
            check(&state.snapshot(owner))?;
            let record = ScheduleRecord::from_draft(Uuid::new_v4().to_string(), owner, draft);
            state.records.push(record.clone());
            record
        };
        debug!("created schedule {} for {}", record.id, owner);
        self.notify(owner)?;
        Ok(record)
    }

    fn list(&self, owner: &str) -> Result<Vec<ScheduleRecord>> {
        Ok(self.lock()?.snapshot(owner))
    }

    fn get(&self, id: &str) -> Result<ScheduleRecord> {
        let state = self.lock()?;
        let index = state.position(id)?;
        Ok(state.records[index].clone())
    }

    fn update(&self, id: &str, patch: SchedulePatch) -> Result<ScheduleRecord> {
        let updated = {
            let mut state = self.lock()?;
            let index = state.position(id)?;
            let mut patched = state.records[index].clone();
            patched.apply(patch);
            patched.validate()?;
            state.records[index] = patched.clone();
            patched
        };
        debug!("updated schedule {}", id);
        self.notify(&updated.owner_id)?;
        Ok(updated)
    }

    fn replace(&self, id: &str, draft: ScheduleDraft) -> Result<ScheduleRecord> {
        draft.validate()?;
        let replaced = {
            let mut state = self.lock()?;
            let index = state.position(id)?;
            let owner = state.records[index].owner_id.clone();
            state.records[index] = ScheduleRecord::from_draft(id, owner, draft);
            state.records[index].clone()
        };
        debug!("replaced schedule {}", id);
        self.notify(&replaced.owner_id)?;
        Ok(replaced)
    }

    fn delete(&self, id: &str) -> Result<()> {
        let removed = {
            let mut state = self.lock()?;
            let index = state.position(id)?;
            state.records.remove(index)
        };
        debug!("deleted schedule {}", id);
        self.notify(&removed.owner_id)
    }

    fn subscribe(&self, owner: &str, listener: Listener) -> Result<SubscriptionId> {
        let (id, snapshot) = {
            let mut state = self.lock()?;
            let id = SubscriptionId(state.next_subscription);
            state.next_subscription += 1;
            state
                .listeners
                .insert(id, (owner.to_string(), Arc::clone(&listener)));
            (id, state.snapshot(owner))
        };
        listener(&snapshot);
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<()> {
        self.lock()?.listeners.remove(&id);
        Ok(())
    }
}
