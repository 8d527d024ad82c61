//! Named-slot storage for persisted state

use crate::error::StoreError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// A key/value store of whole documents, one per named slot.
pub trait SlotStorage: Send {
    /// Read a slot. `Ok(None)` when it has never been written.
    fn read(&self, slot: &str) -> Result<Option<String>, StoreError>;

    /// Replace the slot's contents.
    fn write(&mut self, slot: &str, contents: &str) -> Result<(), StoreError>;
}

/// One JSON file per slot inside a data directory.
///
/// Writes go to a temporary sibling file that is then renamed over the
/// slot file, so a crash mid-write leaves the previous contents in place.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File backing a slot. `library:books` is stored as `library_books.json`.
    pub fn slot_path(&self, slot: &str) -> PathBuf {
        let name: String = slot
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

impl SlotStorage for FileStorage {
    fn read(&self, slot: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.slot_path(slot)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, slot: &str, contents: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.slot_path(slot);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-memory slots. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SlotStorage for MemoryStorage {
    fn read(&self, slot: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().get(slot).cloned())
    }

    fn write(&mut self, slot: &str, contents: &str) -> Result<(), StoreError> {
        self.lock().insert(slot.to_string(), contents.to_string());
        Ok(())
    }
}
