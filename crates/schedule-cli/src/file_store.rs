//! Schedule and note stores persisted as JSON arrays on disk.
//!
//! Each file is read once on open and rewritten after every mutation, via a
//! temp file renamed into place.

use std::path::{Path, PathBuf};

use log::debug;
use schedule_engine::error::{Result, ScheduleError};
use schedule_engine::{
    Listener, MemoryNoteStore, MemoryStore, Note, NoteStore, ScheduleDraft, SchedulePatch,
    ScheduleRecord, ScheduleStore, SubscriptionId,
};
use serde::Serialize;

/// Contents of `path`, or `None` if it is missing or blank.
fn read_existing(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| ScheduleError::Store(format!("could not read {}: {}", path.display(), e)))?;
    if content.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(content))
    }
}

/// Write `value` as pretty JSON to a sibling temp file, then rename it over
/// `path`.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            ScheduleError::Store(format!("could not create {}: {}", parent.display(), e))
        })?;
    }

    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);
    std::fs::write(&temp, json).map_err(|e| {
        ScheduleError::Store(format!("could not write {}: {}", temp.display(), e))
    })?;
    std::fs::rename(&temp, path).map_err(|e| {
        ScheduleError::Store(format!("could not replace {}: {}", path.display(), e))
    })
}

pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self> {
        let records = match read_existing(path)? {
            Some(content) => ScheduleRecord::list_from_json(&content)?,
            None => Vec::new(),
        };
        debug!("loaded {} schedules from {}", records.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            inner: MemoryStore::with_records(records),
        })
    }

    fn save(&self) -> Result<()> {
        write_json(&self.path, &self.inner.all_records()?)
    }
}

impl ScheduleStore for JsonFileStore {
    fn create(&self, owner: &str, draft: ScheduleDraft) -> Result<ScheduleRecord> {
        let record = self.inner.create(owner, draft)?;
        self.save()?;
        Ok(record)
    }

    fn create_checked(
        &self,
        owner: &str,
        draft: ScheduleDraft,
        check: &dyn Fn(&[ScheduleRecord]) -> Result<()>,
    ) -> Result<ScheduleRecord> {
        let record = self.inner.create_checked(owner, draft, check)?;
        self.save()?;
        Ok(record)
    }

    fn list(&self, owner: &str) -> Result<Vec<ScheduleRecord>> {
        self.inner.list(owner)
    }

    fn get(&self, id: &str) -> Result<ScheduleRecord> {
        self.inner.get(id)
    }

    fn update(&self, id: &str, patch: SchedulePatch) -> Result<ScheduleRecord> {
        let record = self.inner.update(id, patch)?;
        self.save()?;
        Ok(record)
    }

    fn replace(&self, id: &str, draft: ScheduleDraft) -> Result<ScheduleRecord> {
        let record = self.inner.replace(id, draft)?;
        self.save()?;
        Ok(record)
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id)?;
        self.save()
    }

    fn subscribe(&self, owner: &str, listener: Listener) -> Result<SubscriptionId> {
        self.inner.subscribe(owner, listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<()> {
        self.inner.unsubscribe(id)
    }
}

pub struct JsonNoteStore {
    path: PathBuf,
    inner: MemoryNoteStore,
}

impl JsonNoteStore {
    /// Open the note file at `path`. A missing file holds no notes.
    pub fn open(path: &Path) -> Result<Self> {
        let notes = match read_existing(path)? {
            Some(content) => Note::list_from_json(&content)?,
            None => Vec::new(),
        };
        debug!("loaded {} notes from {}", notes.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            inner: MemoryNoteStore::with_notes(notes),
        })
    }

    fn save(&self) -> Result<()> {
        write_json(&self.path, &self.inner.all_notes()?)
    }
}

impl NoteStore for JsonNoteStore {
    fn add(&self, owner: &str, text: &str) -> Result<Note> {
        let note = self.inner.add(owner, text)?;
        self.save()?;
        Ok(note)
    }

    fn list(&self, owner: &str) -> Result<Vec<Note>> {
        self.inner.list(owner)
    }

    fn delete(&self, owner: &str, id: i64) -> Result<()> {
        self.inner.delete(owner, id)?;
        self.save()
    }
}
