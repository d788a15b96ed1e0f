//! Durable reminder collection.
//!
//! The store is a single pretty-printed JSON array in the state directory,
//! guarded by a sidecar advisory lock. Every read-reconcile-write sequence
//! runs under the exclusive lock; writes replace the file via a temp file
//! and rename so a crash mid-write never leaves a torn collection behind.
//!
//! Unreadable contents are treated as recoverable: reminder data is
//! low-value, so a corrupt file logs a warning and loads as empty rather
//! than wedging every command.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};

use crate::error::{PingmeError, Result};
use crate::reminder::Reminder;

/// File name of the serialized collection inside the state directory.
pub const COLLECTION_FILE: &str = "scheduled.json";

/// Sidecar lock file name.
const LOCK_FILE: &str = ".lock";

/// Exclusive advisory lock over one store.
///
/// Acquired blocking. Released when the guard drops, so every exit path
/// (including panics) gives the lock back.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    fn open_lock_file(path: &Path) -> Result<File> {
        OpenOptions::new()
            .create(true)
            .write(true)
            .open(path)
            .map_err(|e| {
                PingmeError::Storage(format!("cannot open lock file {}: {e}", path.display()))
            })
    }

    fn acquire(path: PathBuf) -> Result<Self> {
        let file = Self::open_lock_file(&path)?;
        file.lock_exclusive().map_err(|e| {
            PingmeError::Storage(format!("cannot lock {}: {e}", path.display()))
        })?;
        debug!(lock = %path.display(), "store lock acquired");
        Ok(Self { file, path })
    }

    fn try_acquire(path: PathBuf) -> Result<Option<Self>> {
        let file = Self::open_lock_file(&path)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self { file, path })),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(PingmeError::Storage(format!(
                "cannot lock {}: {e}",
                path.display()
            ))),
        }
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(lock = %self.path.display(), error = %e, "failed to release store lock");
        } else {
            debug!(lock = %self.path.display(), "store lock released");
        }
    }
}

/// Reminder collection rooted at a fixed state directory.
///
/// Construction is cheap and does not touch the filesystem; the directory
/// and collection file are created lazily on first access.
#[derive(Debug, Clone)]
pub struct ReminderStore {
    state_dir: PathBuf,
}

impl ReminderStore {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
        }
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Path of the serialized collection.
    pub fn collection_path(&self) -> PathBuf {
        self.state_dir.join(COLLECTION_FILE)
    }

    fn lock_path(&self) -> PathBuf {
        self.state_dir.join(LOCK_FILE)
    }

    fn ensure_layout(&self) -> Result<()> {
        fs::create_dir_all(&self.state_dir).map_err(|e| {
            PingmeError::Storage(format!(
                "cannot create state dir {}: {e}",
                self.state_dir.display()
            ))
        })
    }

    /// Acquire the store lock, blocking until it is free.
    pub fn lock(&self) -> Result<StoreLock> {
        self.ensure_layout()?;
        StoreLock::acquire(self.lock_path())
    }

    /// Acquire the store lock without blocking; `None` if another
    /// invocation holds it.
    pub fn try_lock(&self) -> Result<Option<StoreLock>> {
        self.ensure_layout()?;
        StoreLock::try_acquire(self.lock_path())
    }

    /// Read the collection. Requires lock evidence from this store.
    ///
    /// A missing file is an empty collection; unreadable JSON recovers to
    /// an empty collection with a warning.
    pub fn load(&self, _lock: &StoreLock) -> Result<Vec<Reminder>> {
        let path = self.collection_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(PingmeError::Storage(format!(
                    "cannot read {}: {e}",
                    path.display()
                )))
            }
        };

        match serde_json::from_str(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "reminder collection is unreadable; starting over empty"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Replace the collection on disk. Requires lock evidence.
    pub fn save(&self, _lock: &StoreLock, records: &[Reminder]) -> Result<()> {
        let path = self.collection_path();
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(records)?;

        fs::write(&tmp, json).map_err(|e| {
            PingmeError::Storage(format!("cannot write {}: {e}", tmp.display()))
        })?;
        fs::rename(&tmp, &path).map_err(|e| {
            PingmeError::Storage(format!("cannot replace {}: {e}", path.display()))
        })?;

        debug!(path = %path.display(), count = records.len(), "collection persisted");
        Ok(())
    }

    /// Run `f` over the collection under the exclusive lock, persisting the
    /// (possibly mutated) records afterwards.
    pub fn transaction<T>(&self, f: impl FnOnce(&mut Vec<Reminder>) -> Result<T>) -> Result<T> {
        let lock = self.lock()?;
        let mut records = self.load(&lock)?;
        let out = f(&mut records)?;
        self.save(&lock, &records)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use tempfile::TempDir;

    fn sample(id: &str) -> Reminder {
        let now = Local::now();
        Reminder::new(id.to_string(), now, format!("reminder {id}"), now)
    }

    #[test]
    fn test_lazy_initialization_on_first_access() {
        let tmp = TempDir::new().unwrap();
        let store = ReminderStore::new(tmp.path().join("state"));
        assert!(!store.state_dir().exists());

        store
            .transaction(|records| {
                records.push(sample("aa00aa00"));
                Ok(())
            })
            .unwrap();

        assert!(store.collection_path().exists());
        let lock = store.lock().unwrap();
        let records = store.load(&lock).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "aa00aa00");
    }

    #[test]
    fn test_missing_file_is_empty_collection() {
        let tmp = TempDir::new().unwrap();
        let store = ReminderStore::new(tmp.path());
        let lock = store.lock().unwrap();
        assert!(store.load(&lock).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_recovers_to_empty() {
        let tmp = TempDir::new().unwrap();
        let store = ReminderStore::new(tmp.path());
        fs::write(store.collection_path(), "{definitely not json").unwrap();

        let lock = store.lock().unwrap();
        assert!(store.load(&lock).unwrap().is_empty());

        // And the store is usable again afterwards.
        store.save(&lock, &[sample("bb11bb11")]).unwrap();
        assert_eq!(store.load(&lock).unwrap().len(), 1);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        let store = ReminderStore::new(tmp.path());
        let lock = store.lock().unwrap();
        store.save(&lock, &[sample("cc22cc22")]).unwrap();

        let leftovers: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .filter(|name| name.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "unexpected temp files: {leftovers:?}");
    }

    #[test]
    fn test_exclusive_lock_blocks_second_acquisition() {
        let tmp = TempDir::new().unwrap();
        let store = ReminderStore::new(tmp.path());

        let held = store.lock().unwrap();
        assert!(store.try_lock().unwrap().is_none());

        drop(held);
        assert!(store.try_lock().unwrap().is_some());
    }

    #[test]
    fn test_transaction_persists_mutations() {
        let tmp = TempDir::new().unwrap();
        let store = ReminderStore::new(tmp.path());

        store
            .transaction(|records| {
                records.push(sample("dd33dd33"));
                records.push(sample("ee44ee44"));
                Ok(())
            })
            .unwrap();

        let removed = store
            .transaction(|records| {
                records.retain(|r| r.id != "dd33dd33");
                Ok(records.len())
            })
            .unwrap();
        assert_eq!(removed, 1);

        let lock = store.lock().unwrap();
        let records = store.load(&lock).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "ee44ee44");
    }
}
