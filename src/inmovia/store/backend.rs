use crate::error::Result;
use crate::model::Record;
use fs2::FileExt;
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

/// Identifies the state of a collection at load time.
/// A save is only accepted if the collection is still at the revision it was loaded at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revision {
    /// The collection has never been written.
    Absent,
    At(u64),
}

/// A whole collection as read from storage.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub records: Vec<Record>,
    pub revision: Revision,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            revision: Revision::Absent,
        }
    }
}

/// Exclusive write access to one collection. Released on drop.
#[derive(Debug)]
pub struct CollectionLock {
    file: Option<File>,
}

impl CollectionLock {
    /// A lock with nothing to release, for backends without cross-process state.
    pub fn in_process() -> Self {
        Self { file: None }
    }

    pub fn file(file: File) -> Self {
        Self { file: Some(file) }
    }
}

impl Drop for CollectionLock {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            let _ = FileExt::unlock(file);
        }
    }
}

/// Abstract interface for raw collection I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while RecordStore handles the "what" (ids, merging, typing).
pub trait StorageBackend: Send + Sync {
    /// Load a collection.
    /// A collection that was never written loads as an empty snapshot.
    /// Anything present but unreadable is a `StorageRead` error, never an empty snapshot.
    fn load(&self, collection: &str) -> Result<Snapshot>;

    /// Replace the whole collection.
    /// MUST be atomic, and MUST fail with `ConcurrentModification`
    /// if the collection is no longer at `expected`.
    fn save(&self, collection: &str, records: &[Record], expected: Revision) -> Result<()>;

    /// Acquire exclusive write access, waiting at most `timeout`.
    fn lock(&self, collection: &str, timeout: Duration) -> Result<CollectionLock>;

    /// Where the collection lives. Virtual for non-file backends.
    fn collection_path(&self, collection: &str) -> PathBuf;

    /// Names of all collections that have been written.
    fn list_collections(&self) -> Result<Vec<String>>;

    /// Remove leftovers of interrupted writes. Returns how many were removed.
    fn clean_temp_files(&self, collection: &str) -> Result<usize>;
}
