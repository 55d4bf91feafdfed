// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable storage for the queue's persisted state.
//!
//! Only the event list and the history counters are persisted; network and
//! processing flags are transient. The file backend writes the whole blob to
//! a temp file, fsyncs it, and renames it over the previous copy, so a crash
//! mid-write leaves the last good state in place.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::event::QueuedEvent;

/// Name of the persisted blob.
pub const STORAGE_NAME: &str = "offline-queue-storage";

/// The persisted subset of queue state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedQueue {
    #[serde(default)]
    pub queued_events: Vec<QueuedEvent>,
    #[serde(default)]
    pub total_events: u64,
    #[serde(default)]
    pub failed_events: u64,
    #[serde(default)]
    pub completed_events: u64,
    /// Id sequence; unlike `total_events` it survives a full clear.
    #[serde(default)]
    pub sequence: u64,
}

/// Backend that can load and save [`PersistedQueue`] snapshots.
pub trait Storage: Send {
    /// Loads the last saved state, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<PersistedQueue>>;

    /// Replaces the saved state.
    fn save(&self, state: &PersistedQueue) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn load(&self) -> Result<Option<PersistedQueue>> {
        (**self).load()
    }

    fn save(&self, state: &PersistedQueue) -> Result<()> {
        (**self).save(state)
    }
}

/// JSON file storage inside a state directory.
///
/// Holds an exclusive lock on `offline-queue-storage.lock` for its lifetime so
/// two processes never own the same queue.
pub struct FileStorage {
    path: PathBuf,
    _lock: File,
}

impl FileStorage {
    /// Opens (creating if needed) the storage in `dir` and takes the lock.
    pub fn open(dir: &Path) -> Result<Self> {
        use fs2::FileExt;

        fs::create_dir_all(dir)?;

        let lock_path = dir.join(format!("{STORAGE_NAME}.lock"));
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&lock_path)?;
        lock.try_lock_exclusive()
            .map_err(|_| Error::Locked(dir.display().to_string()))?;

        Ok(FileStorage {
            path: dir.join(format!("{STORAGE_NAME}.json")),
            _lock: lock,
        })
    }

    /// Path of the JSON blob.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn load(&self) -> Result<Option<PersistedQueue>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let state = serde_json::from_str(&content)
            .map_err(|e| Error::CorruptedData(format!("{}: {}", self.path.display(), e)))?;
        Ok(Some(state))
    }

    fn save(&self, state: &PersistedQueue) -> Result<()> {
        let tmp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_string(state)?;

        let mut file = File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }
}

/// In-memory storage. Clones share the same slot, which lets a test drop a
/// queue and reopen it from the same "disk".
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blob: Arc<Mutex<Option<String>>>,
    fail_writes: Arc<Mutex<bool>>,
}

impl MemoryStorage {
    /// Creates empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `save` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap_or_else(|e| e.into_inner()) = fail;
    }

    /// Returns the raw saved JSON, if any.
    pub fn raw(&self) -> Option<String> {
        self.blob.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Option<PersistedQueue>> {
        match self.raw() {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, state: &PersistedQueue) -> Result<()> {
        if *self.fail_writes.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(Error::Io(std::io::Error::other("storage write disabled")));
        }
        let json = serde_json::to_string(state)?;
        *self.blob.lock().unwrap_or_else(|e| e.into_inner()) = Some(json);
        Ok(())
    }
}

#[cfg(test)]
#[path = "storage_tests.rs"]
mod tests;
