use super::backend::StorageBackend;
use super::{DoctorReport, StoreOptions};
use crate::error::{Result, StoreError};
use crate::merge;
use crate::model::{
    record_id, timestamp, Entity, Record, CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD,
};
use chrono::Utc;
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// CRUD over one collection.
///
/// Every call re-reads the collection; nothing is cached between calls.
/// Mutations run as one read-modify-write cycle under the collection's gate
/// and the backend's exclusive lock.
pub struct RecordStore<E, B> {
    name: String,
    backend: Arc<B>,
    gate: Arc<Mutex<()>>,
    options: StoreOptions,
    _entity: PhantomData<fn() -> E>,
}

impl<E, B> Clone for RecordStore<E, B> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            backend: Arc::clone(&self.backend),
            gate: Arc::clone(&self.gate),
            options: self.options,
            _entity: PhantomData,
        }
    }
}

/// Outcome of a mutation closure: whether the collection must be written back.
enum Change<T> {
    Write(T),
    Keep(T),
}

impl<E: Entity, B: StorageBackend> RecordStore<E, B> {
    /// Stores for the same collection must share `gate`; [`crate::db::Database`] takes care of that.
    pub fn new(name: String, backend: Arc<B>, gate: Arc<Mutex<()>>, options: StoreOptions) -> Self {
        Self {
            name,
            backend,
            gate,
            options,
            _entity: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> PathBuf {
        self.backend.collection_path(&self.name)
    }

    // --- Reads ---

    pub fn find_all(&self) -> Result<Vec<E>> {
        let records = self.load_records()?;
        records.into_iter().map(|r| self.decode(r)).collect()
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<E>> {
        let records = self.load_records()?;
        records
            .into_iter()
            .find(|r| record_id(r) == Some(id))
            .map(|r| self.decode(r))
            .transpose()
    }

    /// Every record exactly as stored, after checking that each one decodes as `E`.
    pub fn find_all_stored(&self) -> Result<Vec<Record>> {
        let records = self.load_records()?;
        for record in &records {
            self.decode(record.clone())?;
        }
        Ok(records)
    }

    pub fn find_stored_by_id(&self, id: &str) -> Result<Option<Record>> {
        let records = self.load_records()?;
        let Some(record) = records.into_iter().find(|r| record_id(r) == Some(id)) else {
            return Ok(None);
        };
        self.decode(record.clone())?;
        Ok(Some(record))
    }

    pub fn find_by<P>(&self, predicate: P) -> Result<Vec<E>>
    where
        P: Fn(&E) -> bool,
    {
        Ok(self.find_all()?.into_iter().filter(|e| predicate(e)).collect())
    }

    pub fn find_first<P>(&self, predicate: P) -> Result<Option<E>>
    where
        P: Fn(&E) -> bool,
    {
        Ok(self.find_all()?.into_iter().find(|e| predicate(e)))
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.load_records()?.len())
    }

    // --- Mutations ---

    /// Append one record. Any `id` in the draft is replaced by a fresh one.
    pub fn create<D: Serialize>(&self, draft: D) -> Result<E> {
        let mut created = self.create_many([draft])?;
        created
            .pop()
            .ok_or_else(|| StoreError::InvalidRecord("create produced no record".to_string()))
    }

    /// Like [`Self::create`], returning the record as it was stored.
    pub fn create_stored<D: Serialize>(&self, draft: D) -> Result<Record> {
        let mut created = self.insert([draft])?;
        created
            .pop()
            .map(|(_, stored)| stored)
            .ok_or_else(|| StoreError::InvalidRecord("create produced no record".to_string()))
    }

    /// Append several records in a single read-modify-write cycle.
    pub fn create_many<D, I>(&self, drafts: I) -> Result<Vec<E>>
    where
        D: Serialize,
        I: IntoIterator<Item = D>,
    {
        Ok(self.insert(drafts)?.into_iter().map(|(entity, _)| entity).collect())
    }

    fn insert<D, I>(&self, drafts: I) -> Result<Vec<(E, Record)>>
    where
        D: Serialize,
        I: IntoIterator<Item = D>,
    {
        let drafts = drafts
            .into_iter()
            .map(|d| to_record(&d))
            .collect::<Result<Vec<_>>>()?;
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let created = self.mutate(|records| {
            let mut taken: HashSet<String> = records
                .iter()
                .filter_map(record_id)
                .map(str::to_string)
                .collect();
            let now = timestamp(Utc::now());
            let mut created = Vec::with_capacity(drafts.len());

            for mut draft in drafts {
                draft.remove(ID_FIELD);
                let id = self.options.id_strategy.generate(&taken);
                taken.insert(id.clone());

                let mut record = Record::new();
                record.insert(ID_FIELD.to_string(), Value::String(id));
                record.extend(draft);
                if E::TRACKS_TIMESTAMPS {
                    if record.get(CREATED_AT_FIELD).map_or(true, Value::is_null) {
                        record.insert(CREATED_AT_FIELD.to_string(), now.clone());
                    }
                    record.insert(UPDATED_AT_FIELD.to_string(), now.clone());
                }

                let (entity, stored) = self.finish(record)?;
                records.push(stored.clone());
                created.push((entity, stored));
            }
            Ok(Change::Write(created))
        })?;

        info!(collection = %self.name, count = created.len(), "created records");
        Ok(created)
    }

    /// Shallow-merge `patch` into the record with `id`.
    /// Returns `None`, leaving the collection untouched, when there is no such record.
    pub fn update<P: Serialize>(&self, id: &str, patch: P) -> Result<Option<E>> {
        Ok(self.merge_into(id, patch)?.map(|(entity, _)| entity))
    }

    /// Like [`Self::update`], returning the record as it was stored.
    pub fn update_stored<P: Serialize>(&self, id: &str, patch: P) -> Result<Option<Record>> {
        Ok(self.merge_into(id, patch)?.map(|(_, stored)| stored))
    }

    fn merge_into<P: Serialize>(&self, id: &str, patch: P) -> Result<Option<(E, Record)>> {
        let patch = to_record(&patch)?;

        self.mutate(|records| {
            let Some(position) = records.iter().position(|r| record_id(r) == Some(id)) else {
                return Ok(Change::Keep(None));
            };

            let mut record = records[position].clone();
            merge::apply(&mut record, patch, E::NESTED_MERGE_FIELDS);
            if E::TRACKS_TIMESTAMPS {
                record.insert(UPDATED_AT_FIELD.to_string(), timestamp(Utc::now()));
            }

            let (entity, stored) = self.finish(record)?;
            records[position] = stored.clone();
            debug!(collection = %self.name, id, "updated record");
            Ok(Change::Write(Some((entity, stored))))
        })
    }

    /// Remove the record with `id`. Returns `false` when there was nothing to remove.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let removed = self.mutate(|records| {
            match records.iter().position(|r| record_id(r) == Some(id)) {
                Some(position) => {
                    records.remove(position);
                    Ok(Change::Write(true))
                }
                None => Ok(Change::Keep(false)),
            }
        })?;

        if removed {
            info!(collection = %self.name, id, "deleted record");
        }
        Ok(removed)
    }

    /// Remove every record matching `predicate`. Returns how many were removed.
    pub fn delete_where<P>(&self, predicate: P) -> Result<usize>
    where
        P: Fn(&E) -> bool,
    {
        let removed = self.mutate(|records| {
            let before = records.len();
            let mut kept = Vec::with_capacity(before);
            for record in records.iter() {
                let entity = self.decode(record.clone())?;
                if !predicate(&entity) {
                    kept.push(record.clone());
                }
            }
            let removed = before - kept.len();
            *records = kept;
            Ok(if removed > 0 {
                Change::Write(removed)
            } else {
                Change::Keep(0)
            })
        })?;

        if removed > 0 {
            info!(collection = %self.name, removed, "deleted matching records");
        }
        Ok(removed)
    }

    // --- Maintenance ---

    /// Persist the entity's derived defaults into every record.
    /// Returns how many records changed on disk.
    pub fn migrate(&self) -> Result<usize> {
        let changed = self.mutate(|records| {
            let mut changed = 0;
            for record in records.iter_mut() {
                let entity = self.decode(record.clone())?;
                let (_, normalized) = self.derive(record.clone(), entity)?;
                if normalized != *record {
                    *record = normalized;
                    changed += 1;
                }
            }
            Ok(if changed > 0 {
                Change::Write(changed)
            } else {
                Change::Keep(0)
            })
        })?;

        info!(collection = %self.name, changed, "migrated collection");
        Ok(changed)
    }

    /// Check the collection's identity invariants and repair what can be repaired:
    /// records without a usable id and records repeating an earlier id get fresh ids.
    /// A collection that does not parse is reported as an error and left untouched.
    pub fn doctor(&self) -> Result<DoctorReport> {
        let mut report = self.mutate(|records| {
            let mut report = DoctorReport {
                records: records.len(),
                ..Default::default()
            };
            let mut taken: HashSet<String> = records
                .iter()
                .filter_map(record_id)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect();
            let mut seen = HashSet::new();

            for record in records.iter_mut() {
                let current = record_id(record)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string);
                let needs_id = match current {
                    Some(id) if seen.insert(id.clone()) => false,
                    Some(_) => {
                        report.duplicate_ids += 1;
                        true
                    }
                    None => {
                        report.missing_ids += 1;
                        true
                    }
                };

                if needs_id {
                    let id = self.options.id_strategy.generate(&taken);
                    warn!(collection = %self.name, id = %id, "assigning fresh id");
                    taken.insert(id.clone());
                    seen.insert(id.clone());
                    record.insert(ID_FIELD.to_string(), Value::String(id));
                }
            }

            Ok(if report.missing_ids + report.duplicate_ids > 0 {
                Change::Write(report)
            } else {
                Change::Keep(report)
            })
        })?;

        let _gate = self.enter()?;
        let _lock = self.backend.lock(&self.name, self.options.lock_timeout)?;
        report.removed_temp_files = self.backend.clean_temp_files(&self.name)?;
        Ok(report)
    }

    // --- Internals ---

    fn enter(&self) -> Result<MutexGuard<'_, ()>> {
        self.gate
            .try_lock_for(self.options.lock_timeout)
            .ok_or_else(|| StoreError::StorageTimeout {
                collection: self.name.clone(),
                waited: self.options.lock_timeout,
            })
    }

    /// Load for reading. Every record must carry a string id, whichever record the caller asks for.
    fn load_records(&self) -> Result<Vec<Record>> {
        let _gate = self.enter()?;
        let records = self.backend.load(&self.name)?.records;
        if let Some(position) = records.iter().position(|r| record_id(r).is_none()) {
            return Err(StoreError::read(
                &self.name,
                format!("record #{} has no string id (run doctor)", position),
            ));
        }
        Ok(records)
    }

    /// Run one read-modify-write cycle. A load failure aborts before anything is written.
    fn mutate<T, F>(&self, apply: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Record>) -> Result<Change<T>>,
    {
        let _gate = self.enter()?;
        let _lock = self.backend.lock(&self.name, self.options.lock_timeout)?;

        let snapshot = self.backend.load(&self.name)?;
        let mut records = snapshot.records;

        match apply(&mut records)? {
            Change::Write(value) => {
                self.backend.save(&self.name, &records, snapshot.revision)?;
                Ok(value)
            }
            Change::Keep(value) => Ok(value),
        }
    }

    fn decode(&self, record: Record) -> Result<E> {
        serde_json::from_value(Value::Object(record)).map_err(|e| StoreError::read(&self.name, e))
    }

    /// Check a record about to be written and apply the entity's defaults.
    fn finish(&self, record: Record) -> Result<(E, Record)> {
        let entity: E = serde_json::from_value(Value::Object(record.clone()))
            .map_err(|e| StoreError::InvalidRecord(format!("{}: {}", self.name, e)))?;
        self.derive(record, entity)
    }

    /// Normalize `entity` and copy only what normalization changed into `record`.
    /// Every other stored value stays exactly as it was written.
    fn derive(&self, mut record: Record, mut entity: E) -> Result<(E, Record)> {
        let before = to_record(&entity)?;
        entity.normalize();
        let after = to_record(&entity)?;
        overlay_derived(&mut record, &before, &after);
        Ok((entity, record))
    }
}

/// Apply the difference between two serialized forms of an entity to `stored`.
/// Nested objects are compared member by member.
fn overlay_derived(stored: &mut Record, before: &Record, after: &Record) {
    for (key, derived) in after {
        let original = before.get(key);
        if original == Some(derived) {
            continue;
        }
        if let (Some(Value::Object(was)), Value::Object(now)) = (original, derived) {
            if let Some(Value::Object(target)) = stored.get_mut(key) {
                overlay_derived(target, was, now);
                continue;
            }
        }
        stored.insert(key.clone(), derived.clone());
    }
    for key in before.keys() {
        if !after.contains_key(key) {
            stored.shift_remove(key);
        }
    }
}

pub(crate) fn to_record<T: Serialize>(value: &T) -> Result<Record> {
    match serde_json::to_value(value)? {
        Value::Object(record) => Ok(record),
        other => Err(StoreError::InvalidRecord(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}
