//! # Database Handle
//!
//! A [`Database`] is built once at startup with an injected backend and hands
//! out [`RecordStore`]s. It owns the gate registry: every store for the same
//! collection shares one mutex, so two handles to `contacts` can never run
//! overlapping read-modify-write cycles.

use crate::config::StoreConfig;
use crate::error::Result;
use crate::model::{Collection, Entity, Record};
use crate::store::backend::StorageBackend;
use crate::store::fs_backend::FsBackend;
use crate::store::record_store::RecordStore;
use crate::store::{validate_collection_name, StoreOptions};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub struct Database<B: StorageBackend> {
    backend: Arc<B>,
    options: StoreOptions,
    gates: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Database<FsBackend> {
    /// Open the file-backed database rooted at `data_dir`.
    pub fn open(data_dir: PathBuf, config: &StoreConfig) -> Self {
        info!(data_dir = %data_dir.display(), "opening database");
        let backend = FsBackend::new(data_dir)
            .with_pretty(config.pretty)
            .with_io_timeout(config.io_timeout());
        Self::new(backend, config.options())
    }
}

impl<B: StorageBackend> Database<B> {
    pub fn new(backend: B, options: StoreOptions) -> Self {
        Self {
            backend: Arc::new(backend),
            options,
            gates: Mutex::new(HashMap::new()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// Typed store for an entity with a well-known collection.
    pub fn collection<E: Collection>(&self) -> RecordStore<E, B> {
        self.store_unchecked(E::COLLECTION)
    }

    /// Typed store over an arbitrary collection name.
    pub fn store<E: Entity>(&self, name: &str) -> Result<RecordStore<E, B>> {
        validate_collection_name(name)?;
        Ok(self.store_unchecked(name))
    }

    /// Untyped store: records are plain JSON objects.
    pub fn raw(&self, name: &str) -> Result<RecordStore<Record, B>> {
        self.store(name)
    }

    /// Names of every collection present in storage.
    pub fn collections(&self) -> Result<Vec<String>> {
        self.backend.list_collections()
    }

    fn store_unchecked<E: Entity>(&self, name: &str) -> RecordStore<E, B> {
        RecordStore::new(
            name.to_string(),
            Arc::clone(&self.backend),
            self.gate(name),
            self.options,
        )
    }

    fn gate(&self, name: &str) -> Arc<Mutex<()>> {
        let mut gates = self.gates.lock();
        Arc::clone(gates.entry(name.to_string()).or_default())
    }
}
