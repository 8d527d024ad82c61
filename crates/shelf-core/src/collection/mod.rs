//! The owned-book collection
//!
//! An insertion-ordered list of `BookRecord`s with unique ids, persisted as
//! a JSON array in a single storage slot. Every change is written through
//! immediately; there is no expiry or eviction.

pub mod storage;

pub use storage::*;

use crate::domain::{BookRecord, BookStatus};
use crate::error::StoreError;
use tracing::{info, warn};

/// Storage slot holding the serialized collection.
pub const LIBRARY_SLOT: &str = "library:books";

pub struct Collection<S: SlotStorage> {
    books: Vec<BookRecord>,
    storage: S,
}

impl<S: SlotStorage> Collection<S> {
    /// Load the collection from storage.
    ///
    /// A missing slot gives an empty collection. So does unreadable or
    /// corrupt data, which is logged and left untouched until the next
    /// mutation overwrites it. Duplicate ids in stored data keep their first
    /// occurrence.
    pub fn load(storage: S) -> Self {
        let books = match storage.read(LIBRARY_SLOT) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<BookRecord>>(&json) {
                Ok(books) => dedupe(books),
                Err(e) => {
                    warn!(error = %e, "stored collection is corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "could not read stored collection, starting empty");
                Vec::new()
            }
        };

        Self { books, storage }
    }

    pub fn books(&self) -> &[BookRecord] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&BookRecord> {
        self.books.iter().find(|b| b.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Append a record. Returns false, without writing, if its id is
    /// already present.
    pub fn add(&mut self, record: BookRecord) -> Result<bool, StoreError> {
        if self.contains(&record.id) {
            return Ok(false);
        }
        info!(id = %record.id, title = %record.title, "adding book");
        let mut next = self.books.clone();
        next.push(record);
        self.commit(next)?;
        Ok(true)
    }

    /// Remove the record with `id`. Returns false if it was not present.
    pub fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        if !self.contains(id) {
            return Ok(false);
        }
        let next: Vec<BookRecord> = self.books.iter().filter(|b| b.id != id).cloned().collect();
        self.commit(next)?;
        info!(%id, "removed book");
        Ok(true)
    }

    /// Set the status of the record with `id` in place. Returns false if
    /// it was not present.
    pub fn set_status(&mut self, id: &str, status: BookStatus) -> Result<bool, StoreError> {
        let Some(pos) = self.books.iter().position(|b| b.id == id) else {
            return Ok(false);
        };
        let mut next = self.books.clone();
        next[pos].status = status;
        self.commit(next)?;
        info!(%id, %status, "status changed");
        Ok(true)
    }

    /// Flip between available and checked out. Returns the new status.
    pub fn toggle_status(&mut self, id: &str) -> Result<Option<BookStatus>, StoreError> {
        let Some(next) = self.get(id).map(|b| b.status.toggled()) else {
            return Ok(None);
        };
        self.set_status(id, next)?;
        Ok(Some(next))
    }

    /// Write `next` to storage, then make it the current list. A failed
    /// write leaves the in-memory collection as it was.
    fn commit(&mut self, next: Vec<BookRecord>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&next)?;
        self.storage.write(LIBRARY_SLOT, &json)?;
        self.books = next;
        Ok(())
    }
}

fn dedupe(books: Vec<BookRecord>) -> Vec<BookRecord> {
    let mut seen = std::collections::HashSet::new();
    books
        .into_iter()
        .filter(|b| seen.insert(b.id.clone()))
        .collect()
}
