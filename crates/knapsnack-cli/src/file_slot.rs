//! File-backed snapshot slot.
//!
//! Each key maps to `<dir>/<key>.json`. Writes go through a temporary file
//! and a rename so an interrupted save never leaves half a snapshot behind.

use knapsnack_core::{KeyValueSlot, StorageError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory of JSON files, one per key.
#[derive(Debug, Clone)]
pub(crate) struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    /// Slot rooted at `dir`. The directory is created on first write.
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `key`.
    pub(crate) fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueSlot for FileSlot {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), bytes = value.len(), "slot written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use knapsnack_core::{FormData, LoadOutcome, PersistenceStore, Snapshot};
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let slot = FileSlot::new(dir.path());
        assert_eq!(slot.read("knapsnack_form_state").unwrap(), None);
    }

    #[test]
    fn test_write_creates_directory() {
        let dir = TempDir::new().unwrap();
        let slot = FileSlot::new(dir.path().join("state"));
        slot.write("knapsnack_form_state", "{}").unwrap();
        assert!(dir.path().join("state/knapsnack_form_state.json").exists());
        assert_eq!(
            slot.read("knapsnack_form_state").unwrap(),
            Some("{}".to_string())
        );
    }

    #[test]
    fn test_write_overwrites_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let slot = FileSlot::new(dir.path());
        slot.write("k", "first").unwrap();
        slot.write("k", "second").unwrap();
        assert_eq!(slot.read("k").unwrap(), Some("second".to_string()));
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let slot = FileSlot::new(dir.path());
        slot.write("k", "v").unwrap();
        slot.remove("k").unwrap();
        slot.remove("k").unwrap();
        assert_eq!(slot.read("k").unwrap(), None);
    }

    #[test]
    fn test_key_is_sanitized() {
        let slot = FileSlot::new("/state");
        assert_eq!(
            slot.path_for("../etc/passwd"),
            PathBuf::from("/state/___etc_passwd.json")
        );
    }

    #[test]
    fn test_unreadable_path_reports_io_error() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes the read fail.
        fs::create_dir(dir.path().join("k.json")).unwrap();
        let slot = FileSlot::new(dir.path());
        assert!(matches!(
            slot.read("k"),
            Err(StorageError::Io(_) | StorageError::AccessDenied)
        ));
        let store = PersistenceStore::with_key(&slot, "k");
        assert!(store.load().is_absent());
    }

    #[test]
    fn test_store_roundtrip_on_disk() {
        let dir = TempDir::new().unwrap();
        let store = PersistenceStore::new(FileSlot::new(dir.path()));
        let snapshot = Snapshot::new(3, FormData::default());
        store.save(&snapshot);
        assert_eq!(store.load(), LoadOutcome::Snapshot(snapshot));
    }
}
