//! # Storage Layer
//!
//! Every entity type lives in its own collection: one JSON array in one file.
//! The layer is split the same way for every collection:
//!
//! - [`backend::StorageBackend`]: raw I/O. Loads and saves whole collections,
//!   hands out the cross-process write lock, reports a [`backend::Revision`]
//!   so that writes can detect a file that changed underneath them.
//! - [`record_store::RecordStore`]: the engine. Read-modify-write cycles, id
//!   generation, timestamp stamping, merge semantics, typed decoding.
//!
//! ## Serialization of writers
//!
//! Each collection has one in-process gate (a mutex shared by every store
//! handle for that collection, see [`crate::db::Database`]). Mutations also hold
//! the backend's exclusive lock for the full read-modify-write cycle, so two
//! processes pointed at the same data directory cannot interleave either.
//! Both waits are bounded by [`StoreOptions::lock_timeout`]. The file reads
//! and writes of [`fs_backend::FsBackend`] have their own bound
//! (`io-timeout-ms`), so a hung mount fails with a timeout too.
//!
//! ## Storage Layout
//!
//! ```text
//! data/
//! ├── config.json                 # StoreConfig
//! ├── contacts.json               # [ { "id": ..., ... }, ... ]
//! ├── contacts.lock               # advisory write lock
//! └── .contacts-{uuid}.tmp        # in-flight write, renamed over contacts.json
//! ```
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: production, atomic tmp + rename writes.
//! - [`mem_backend::MemBackend`]: tests, with failure injection.

use crate::error::{Result, StoreError};
use crate::id::IdStrategy;
use std::time::Duration;

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;
pub mod record_store;

pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Bound on a single collection file read or write.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Engine settings shared by every store handed out by one database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    pub id_strategy: IdStrategy,
    pub lock_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            id_strategy: IdStrategy::Uuid,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }
}

/// Report from the `doctor` operation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    pub records: usize,
    pub missing_ids: usize,
    pub duplicate_ids: usize,
    pub removed_temp_files: usize,
}

impl DoctorReport {
    pub fn is_clean(&self) -> bool {
        self.missing_ids == 0 && self.duplicate_ids == 0 && self.removed_temp_files == 0
    }
}

/// Collection names become file names, so they are restricted to
/// lowercase ascii, digits, `_` and `-`.
pub fn validate_collection_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
        && name != fs_backend::CONFIG_STEM;
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidCollection(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_collection_names() {
        assert!(validate_collection_name("contacts").is_ok());
        assert!(validate_collection_name("rental_payments").is_ok());
        assert!(validate_collection_name("office-templates2").is_ok());
    }

    #[test]
    fn rejects_names_that_escape_the_data_dir() {
        for name in ["", "../etc", "a/b", "Contacts", "config", ".hidden"] {
            assert!(
                matches!(
                    validate_collection_name(name),
                    Err(StoreError::InvalidCollection(_))
                ),
                "accepted {:?}",
                name
            );
        }
    }

    #[test]
    fn clean_report() {
        assert!(DoctorReport::default().is_clean());
        let report = DoctorReport {
            duplicate_ids: 1,
            ..Default::default()
        };
        assert!(!report.is_clean());
    }
}
