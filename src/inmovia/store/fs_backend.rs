use super::backend::{CollectionLock, Revision, Snapshot, StorageBackend};
use crate::error::{Result, StoreError};
use crate::model::Record;
use fs2::FileExt;
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::fs::{self, File, OpenOptions};
use std::hash::{Hash, Hasher};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

/// File stem reserved for the store configuration.
pub const CONFIG_STEM: &str = "config";

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(10);

pub struct FsBackend {
    root: PathBuf,
    pretty: bool,
    io_timeout: Duration,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            pretty: true,
            io_timeout: super::DEFAULT_IO_TIMEOUT,
        }
    }

    /// Write compact JSON instead of the two-space pretty form.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Longest a single file read or write may take before it fails with
    /// [`StoreError::StorageTimeout`].
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn data_file(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{}.json", collection))
    }

    fn lock_file(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{}.lock", collection))
    }

    fn temp_prefix(collection: &str) -> String {
        format!(".{}-", collection)
    }

    fn ensure_dir(&self) -> io::Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
        }
        Ok(())
    }

    /// Run `work` on a helper thread and wait at most `io_timeout` for it.
    ///
    /// A stalled read or write (a hung network mount, a FIFO in place of the
    /// file) then surfaces as a timeout instead of blocking the caller. The
    /// worker is told when nobody is waiting any more through the flag it receives.
    fn bounded<T, F>(&self, collection: &str, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&AtomicBool) -> Result<T> + Send + 'static,
    {
        let abandoned = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&abandoned);
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name(format!("inmovia-io-{}", collection))
            .spawn(move || {
                let _ = tx.send(work(flag.as_ref()));
            })?;

        match rx.recv_timeout(self.io_timeout) {
            Ok(outcome) => outcome,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                abandoned.store(true, Ordering::SeqCst);
                warn!(collection, waited = ?self.io_timeout, "file I/O timed out");
                Err(StoreError::StorageTimeout {
                    collection: collection.to_string(),
                    waited: self.io_timeout,
                })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(StoreError::Io(io::Error::other(
                "storage worker exited without a result",
            ))),
        }
    }

    fn encode(&self, collection: &str, records: &[Record]) -> Result<Vec<u8>> {
        let encoded = if self.pretty {
            serde_json::to_vec_pretty(records)
        } else {
            serde_json::to_vec(records)
        };
        encoded.map_err(|e| StoreError::write(collection, e))
    }
}

/// Current on-disk revision, read straight from the file bytes.
fn revision_at(collection: &str, path: &Path) -> Result<Revision> {
    match fs::read(path) {
        Ok(bytes) => Ok(Revision::At(digest(&bytes))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Revision::Absent),
        Err(e) => Err(StoreError::read(collection, e)),
    }
}

/// Revision check, then tmp + `sync_all` + rename so readers see either the
/// old or the new array, never a torn one.
fn replace_file(
    collection: &str,
    target: &Path,
    tmp: &Path,
    content: &[u8],
    expected: Revision,
    abandoned: &AtomicBool,
) -> Result<()> {
    if revision_at(collection, target)? != expected {
        return Err(StoreError::ConcurrentModification {
            collection: collection.to_string(),
        });
    }

    let written = File::create(tmp).and_then(|mut file| {
        file.write_all(content)?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(tmp);
        return Err(StoreError::write(collection, e));
    }

    // The caller already reported a timeout; publishing now would race the next writer.
    if abandoned.load(Ordering::SeqCst) {
        let _ = fs::remove_file(tmp);
        return Err(StoreError::write(collection, "write abandoned after timeout"));
    }

    fs::rename(tmp, target).map_err(|e| {
        let _ = fs::remove_file(tmp);
        StoreError::write(collection, e)
    })
}

fn digest(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

fn parse_collection(collection: &str, bytes: &[u8]) -> Result<Vec<Record>> {
    let values: Vec<Value> =
        serde_json::from_slice(bytes).map_err(|e| StoreError::read(collection, e))?;

    values
        .into_iter()
        .enumerate()
        .map(|(position, value)| match value {
            Value::Object(record) => Ok(record),
            other => Err(StoreError::read(
                collection,
                format!("record #{} is not an object: {}", position, other),
            )),
        })
        .collect()
}

impl StorageBackend for FsBackend {
    fn load(&self, collection: &str) -> Result<Snapshot> {
        let path = self.data_file(collection);
        let name = collection.to_string();
        let read = self.bounded(collection, move |_| match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::read(&name, e)),
        })?;
        let Some(bytes) = read else {
            debug!(collection, "collection file absent, starting empty");
            return Ok(Snapshot::empty());
        };

        let records = parse_collection(collection, &bytes)?;
        debug!(collection, records = records.len(), "loaded collection");
        Ok(Snapshot {
            records,
            revision: Revision::At(digest(&bytes)),
        })
    }

    fn save(&self, collection: &str, records: &[Record], expected: Revision) -> Result<()> {
        self.ensure_dir()
            .map_err(|e| StoreError::write(collection, e))?;

        let content = self.encode(collection, records)?;
        let target = self.data_file(collection);
        let tmp = self.root.join(format!(
            "{}{}.tmp",
            Self::temp_prefix(collection),
            Uuid::new_v4()
        ));
        let name = collection.to_string();
        self.bounded(collection, move |abandoned| {
            replace_file(&name, &target, &tmp, &content, expected, abandoned)
        })?;

        debug!(collection, records = records.len(), "saved collection");
        Ok(())
    }

    fn lock(&self, collection: &str, timeout: Duration) -> Result<CollectionLock> {
        self.ensure_dir()
            .map_err(|e| StoreError::write(collection, e))?;

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_file(collection))
            .map_err(|e| StoreError::write(collection, e))?;

        let started = Instant::now();
        loop {
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => return Ok(CollectionLock::file(file)),
                Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                    if started.elapsed() >= timeout {
                        return Err(StoreError::StorageTimeout {
                            collection: collection.to_string(),
                            waited: started.elapsed(),
                        });
                    }
                    thread::sleep(LOCK_POLL_INTERVAL);
                }
                Err(e) => return Err(StoreError::write(collection, e)),
            }
        }
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.data_file(collection)
    }

    fn list_collections(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if stem != CONFIG_STEM && !stem.starts_with('.') {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn clean_temp_files(&self, collection: &str) -> Result<usize> {
        if !self.root.exists() {
            return Ok(0);
        }

        let prefix = Self::temp_prefix(collection);
        let mut removed = 0;
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            let is_leftover = path
                .file_name()
                .and_then(|s| s.to_str())
                .and_then(|name| name.strip_prefix(&prefix))
                .and_then(|rest| rest.strip_suffix(".tmp"))
                .map(|token| Uuid::parse_str(token).is_ok())
                .unwrap_or(false);
            if is_leftover {
                warn!(collection, path = %path.display(), "removing interrupted write");
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(timeout: Duration) -> (tempfile::TempDir, FsBackend) {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::new(dir.path().to_path_buf()).with_io_timeout(timeout);
        (dir, backend)
    }

    #[test]
    fn slow_io_times_out_and_flags_the_worker() {
        let (_dir, backend) = backend(Duration::from_millis(20));
        let (seen_tx, seen_rx) = mpsc::channel();

        let outcome = backend.bounded("notes", move |abandoned| {
            thread::sleep(Duration::from_millis(200));
            let _ = seen_tx.send(abandoned.load(Ordering::SeqCst));
            Ok(())
        });

        assert!(matches!(
            outcome,
            Err(StoreError::StorageTimeout { waited, .. }) if waited == Duration::from_millis(20)
        ));
        assert!(seen_rx.recv_timeout(Duration::from_secs(5)).unwrap());
    }

    #[test]
    fn fast_io_returns_the_worker_result() {
        let (_dir, backend) = backend(Duration::from_secs(5));
        assert_eq!(backend.bounded("notes", |_| Ok(7)).unwrap(), 7);
        assert!(matches!(
            backend.bounded::<(), _>("notes", |_| Err(StoreError::ConcurrentModification {
                collection: "notes".into()
            })),
            Err(StoreError::ConcurrentModification { .. })
        ));
    }

    #[test]
    fn abandoned_write_is_not_published() {
        let (dir, _) = backend(Duration::from_secs(5));
        let target = dir.path().join("notes.json");
        let tmp = dir.path().join(".notes-x.tmp");
        let abandoned = AtomicBool::new(true);

        let outcome = replace_file("notes", &target, &tmp, b"[]", Revision::Absent, &abandoned);
        assert!(matches!(outcome, Err(StoreError::StorageWrite { .. })));
        assert!(!target.exists());
        assert!(!tmp.exists());
    }
}
