use super::backend::{CollectionLock, Revision, Snapshot, StorageBackend};
use crate::error::{Result, StoreError};
use crate::model::Record;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

struct StoredCollection {
    records: Vec<Record>,
    revision: u64,
}

/// In-memory storage backend for testing.
///
/// Cross-process locking is meaningless here, so `lock` is free; the
/// per-collection gate in the engine still serializes writers.
#[derive(Default)]
pub struct MemBackend {
    collections: RwLock<HashMap<String, StoredCollection>>,
    unreadable: RwLock<HashSet<String>>,
    revisions: AtomicU64,
    simulate_write_error: AtomicBool,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    /// Make every subsequent load of `collection` fail as if the file were corrupt.
    pub fn set_unreadable(&self, collection: &str, unreadable: bool) {
        let mut set = self.unreadable.write();
        if unreadable {
            set.insert(collection.to_string());
        } else {
            set.remove(collection);
        }
    }

    /// Replace a collection behind the engine's back, the way a writer
    /// that ignores the lock would.
    pub fn tamper(&self, collection: &str, records: Vec<Record>) {
        self.put(collection, records);
    }

    fn put(&self, collection: &str, records: Vec<Record>) {
        let revision = self.revisions.fetch_add(1, Ordering::SeqCst) + 1;
        self.collections
            .write()
            .insert(collection.to_string(), StoredCollection { records, revision });
    }
}

impl StorageBackend for MemBackend {
    fn load(&self, collection: &str) -> Result<Snapshot> {
        if self.unreadable.read().contains(collection) {
            return Err(StoreError::read(collection, "simulated corrupt collection"));
        }

        let collections = self.collections.read();
        Ok(match collections.get(collection) {
            Some(stored) => Snapshot {
                records: stored.records.clone(),
                revision: Revision::At(stored.revision),
            },
            None => Snapshot::empty(),
        })
    }

    fn save(&self, collection: &str, records: &[Record], expected: Revision) -> Result<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(StoreError::write(collection, "simulated write error"));
        }

        let current = match self.collections.read().get(collection) {
            Some(stored) => Revision::At(stored.revision),
            None => Revision::Absent,
        };
        if current != expected {
            return Err(StoreError::ConcurrentModification {
                collection: collection.to_string(),
            });
        }

        self.put(collection, records.to_vec());
        Ok(())
    }

    fn lock(&self, _collection: &str, _timeout: Duration) -> Result<CollectionLock> {
        Ok(CollectionLock::in_process())
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        PathBuf::from(format!("memory://{}.json", collection))
    }

    fn list_collections(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn clean_temp_files(&self, _collection: &str) -> Result<usize> {
        Ok(0)
    }
}
