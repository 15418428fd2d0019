//! Snapshot persistence.
//!
//! The wizard writes its whole state, `{ step, data }`, as one JSON blob under
//! a fixed key after every committed change, and reads it back once at
//! start-up. Backends only need to move strings in and out of a
//! [`KeyValueSlot`]; [`PersistenceStore`] owns the format and absorbs every
//! failure so that a broken slot never breaks the wizard.

use crate::error::StorageError;
use crate::form::FormData;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "knapsnack_form_state";

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

const fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Persisted wizard progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Schema version; snapshots written before versioning count as 1.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Current step index
    pub step: usize,
    /// Accumulated form data
    pub data: FormData,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new(0, FormData::default())
    }
}

impl Snapshot {
    /// Snapshot of the current schema version.
    pub const fn new(step: usize, data: FormData) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            step,
            data,
        }
    }
}

/// A durable string slot addressed by key.
pub trait KeyValueSlot {
    /// Read the value stored under `key`.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value stored under `key`.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueSlot + ?Sized> KeyValueSlot for &T {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<T: KeyValueSlot + ?Sized> KeyValueSlot for Rc<T> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<T: KeyValueSlot + ?Sized> KeyValueSlot for Arc<T> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-memory slot, for tests and for hosts without durable storage.
#[derive(Debug, Default)]
pub struct MemorySlot {
    memory: Mutex<HashMap<String, String>>,
}

impl MemorySlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.memory.lock().map(|m| m.len()).unwrap_or(0)
    }

    /// Check if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueSlot for MemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .memory
            .lock()
            .map_err(|_| StorageError::AccessDenied)?
            .get(key)
            .cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.memory
            .lock()
            .map_err(|_| StorageError::AccessDenied)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.memory
            .lock()
            .map_err(|_| StorageError::AccessDenied)?
            .remove(key);
        Ok(())
    }
}

/// Why no snapshot was restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsentReason {
    /// Nothing stored under the key.
    Missing,
    /// The slot could not be read.
    Unreadable,
    /// The stored blob is not a snapshot this version understands.
    Corrupt,
}

/// Result of [`PersistenceStore::load`].
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// A well-formed snapshot.
    Snapshot(Snapshot),
    /// No usable snapshot.
    Absent(AbsentReason),
}

impl LoadOutcome {
    /// Check if no snapshot was restored.
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent(_))
    }

    /// The snapshot, or `{ step: 0, data: defaults }`.
    pub fn into_snapshot_or_default(self) -> Snapshot {
        match self {
            Self::Snapshot(snapshot) => snapshot,
            Self::Absent(_) => Snapshot::default(),
        }
    }
}

/// Reads and writes wizard snapshots under one key.
#[derive(Debug)]
pub struct PersistenceStore<K> {
    slot: K,
    key: String,
}

impl<K: KeyValueSlot> PersistenceStore<K> {
    /// Store under [`DEFAULT_STORAGE_KEY`].
    pub fn new(slot: K) -> Self {
        Self::with_key(slot, DEFAULT_STORAGE_KEY)
    }

    /// Store under a custom key.
    pub fn with_key(slot: K, key: impl Into<String>) -> Self {
        Self {
            slot,
            key: key.into(),
        }
    }

    /// Storage key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Backing slot.
    pub const fn slot(&self) -> &K {
        &self.slot
    }

    /// Read the snapshot. Never fails: unreadable or corrupt data is reported
    /// as [`LoadOutcome::Absent`].
    pub fn load(&self) -> LoadOutcome {
        let raw = match self.slot.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return LoadOutcome::Absent(AbsentReason::Missing),
            Err(e) => {
                warn!(key = %self.key, error = %e, "snapshot slot unreadable, starting fresh");
                return LoadOutcome::Absent(AbsentReason::Unreadable);
            }
        };
        match serde_json::from_str::<Snapshot>(&raw) {
            Ok(snapshot) if snapshot.version <= SNAPSHOT_VERSION => {
                debug!(key = %self.key, step = snapshot.step, "snapshot restored");
                LoadOutcome::Snapshot(snapshot)
            }
            Ok(snapshot) => {
                warn!(
                    key = %self.key,
                    version = snapshot.version,
                    "snapshot written by a newer schema, starting fresh"
                );
                LoadOutcome::Absent(AbsentReason::Corrupt)
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "snapshot corrupt, starting fresh");
                LoadOutcome::Absent(AbsentReason::Corrupt)
            }
        }
    }

    /// Overwrite the stored snapshot. Failures are logged and dropped.
    pub fn save(&self, snapshot: &Snapshot) {
        let result = serde_json::to_string(snapshot)
            .map_err(|e| StorageError::Serialization(e.to_string()))
            .and_then(|json| self.slot.write(&self.key, &json));
        match result {
            Ok(()) => debug!(key = %self.key, step = snapshot.step, "snapshot saved"),
            Err(e) => warn!(key = %self.key, error = %e, "failed to save snapshot"),
        }
    }

    /// Delete the stored snapshot. Returns false if the slot refused.
    pub fn clear(&self) -> bool {
        match self.slot.remove(&self.key) {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to clear snapshot");
                false
            }
        }
    }
}
