//! Free-text notes kept next to an owner's schedule.
//!
//! Notes have no time range and never take part in conflict checks. They
//! are listed in the order they were added.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Creation time in milliseconds since the Unix epoch, made unique by
    /// bumping past the highest id already stored.
    pub id: i64,
    pub owner_id: String,
    pub text: String,
}

impl Note {
    /// Parse a JSON array of notes.
    pub fn list_from_json(json: &str) -> Result<Vec<Note>> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A note must contain something other than whitespace. The text is stored
/// as entered.
pub fn validate_note(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(ScheduleError::MissingField("note"));
    }
    Ok(())
}

pub trait NoteStore {
    /// Validate and append a note for `owner`.
    fn add(&self, owner: &str, text: &str) -> Result<Note>;

    /// `owner`'s notes in insertion order.
    fn list(&self, owner: &str) -> Result<Vec<Note>>;

    /// Remove one of `owner`'s notes.
    fn delete(&self, owner: &str, id: i64) -> Result<()>;
}

/// Thread-safe in-memory note store. Cloning shares the underlying state.
#[derive(Clone, Default)]
pub struct MemoryNoteStore {
    notes: Arc<Mutex<Vec<Note>>>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notes(notes: Vec<Note>) -> Self {
        Self {
            notes: Arc::new(Mutex::new(notes)),
        }
    }

    /// Every stored note across all owners.
    pub fn all_notes(&self) -> Result<Vec<Note>> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Note>>> {
        self.notes
            .lock()
            .map_err(|_| ScheduleError::Store("note store lock poisoned".to_string()))
    }
}

impl NoteStore for MemoryNoteStore {
    fn add(&self, owner: &str, text: &str) -> Result<Note> {
        validate_note(text)?;

        let mut notes = self.lock()?;
        let now = Utc::now().timestamp_millis();
        let id = match notes.iter().map(|n| n.id).max() {
            Some(last) if last >= now => last + 1,
            _ => now,
        };
        let note = Note {
            id,
            owner_id: owner.to_string(),
            text: text.to_string(),
        };
        notes.push(note.clone());
        debug!("added note {} for {}", id, owner);
        Ok(note)
    }

    fn list(&self, owner: &str) -> Result<Vec<Note>> {
        Ok(self
            .lock()?
            .iter()
            .filter(|n| n.owner_id == owner)
            .cloned()
            .collect())
    }

    fn delete(&self, owner: &str, id: i64) -> Result<()> {
        let mut notes = self.lock()?;
        let index = notes
            .iter()
            .position(|n| n.id == id && n.owner_id == owner)
            .ok_or(ScheduleError::NoteNotFound(id))?;
        notes.remove(index);
        debug!("deleted note {} for {}", id, owner);
        Ok(())
    }
}
