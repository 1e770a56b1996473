// Local schedule persistence
//
// One well-defined seam between the store and wherever the document
// lives. Loads are forgiving: a missing file, unparseable JSON, or a
// wrong-shape document all yield `None` so the store falls back to a
// default schedule. Saves swallow failures: the in-memory store stays
// authoritative for the session and there is no retry.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};

use crate::models::schedule::Schedule;

pub const SCHEDULE_FILE_NAME: &str = "schedule.json";

/// Storage backend for the schedule document.
pub trait SchedulePersistence {
    /// Restore the persisted document, or `None` when absent or corrupt.
    fn load(&self) -> Option<Schedule>;

    /// Persist the document. Failures are logged and swallowed.
    fn save(&self, schedule: &Schedule);
}

/// JSON-file persistence at a fixed path.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File store rooted in the platform data directory.
    pub fn default_location() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "schedule-grid")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;
        Ok(Self::new(dirs.data_dir().join(SCHEDULE_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn try_save(&self, schedule: &Schedule) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create dir {}", parent.display()))?;
        }
        let data = schedule
            .to_json_string()
            .context("failed to serialize schedule")?;
        fs::write(&self.path, data)
            .with_context(|| format!("failed to write schedule to {}", self.path.display()))?;
        Ok(())
    }
}

impl SchedulePersistence for FileStore {
    fn load(&self) -> Option<Schedule> {
        if !self.path.exists() {
            return None;
        }
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                log::warn!("Failed to read {}: {}", self.path.display(), err);
                return None;
            }
        };
        let schedule = Schedule::from_json_str(&raw);
        if schedule.is_none() {
            log::warn!(
                "Stored schedule at {} is corrupt or the wrong shape, ignoring it",
                self.path.display()
            );
        }
        schedule
    }

    fn save(&self, schedule: &Schedule) {
        if let Err(err) = self.try_save(schedule) {
            log::warn!("Failed to persist schedule: {:#}", err);
        }
    }
}

/// In-memory persistence for tests and embedders without a filesystem.
/// Clones share the same slot, so a test can keep a handle after handing
/// one to the store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    slot: Rc<RefCell<Option<Schedule>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the slot with an existing document.
    pub fn with_schedule(schedule: Schedule) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(schedule))),
        }
    }

    /// The last saved document, if any.
    pub fn snapshot(&self) -> Option<Schedule> {
        self.slot.borrow().clone()
    }
}

impl SchedulePersistence for MemoryStore {
    fn load(&self) -> Option<Schedule> {
        self.slot.borrow().clone()
    }

    fn save(&self, schedule: &Schedule) {
        *self.slot.borrow_mut() = Some(schedule.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join(SCHEDULE_FILE_NAME));

        assert!(store.load().is_none());

        let schedule = Schedule::default();
        store.save(&schedule);
        assert_eq!(store.load(), Some(schedule));
    }

    #[test]
    fn test_file_store_rejects_corrupt_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SCHEDULE_FILE_NAME);

        fs::write(&path, "{ not json").unwrap();
        assert!(FileStore::new(&path).load().is_none());

        fs::write(&path, r#"{"items": []}"#).unwrap();
        assert!(FileStore::new(&path).load().is_none());
    }

    #[test]
    fn test_memory_store_shares_slot_across_clones() {
        let store = MemoryStore::new();
        let handle = store.clone();

        assert!(handle.snapshot().is_none());
        store.save(&Schedule::default());
        assert_eq!(handle.snapshot(), Some(Schedule::default()));
    }
}
