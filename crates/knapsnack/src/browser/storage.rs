//! Browser storage bindings for localStorage and sessionStorage.
//!
//! [`Storage`] is the [`KeyValueSlot`] the wizard persists through in the
//! browser.
//!
//! # Example
//!
//! ```ignore
//! use knapsnack::browser::storage::{Storage, StorageType};
//! use knapsnack::PersistenceStore;
//!
//! let store = PersistenceStore::new(Storage::new(StorageType::Local));
//! let outcome = store.load();
//! ```

#[cfg(not(target_arch = "wasm32"))]
use knapsnack_core::MemorySlot;
use knapsnack_core::{KeyValueSlot, StorageError};

/// Storage type (local or session).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageType {
    /// localStorage - persists across browser sessions
    #[default]
    Local,
    /// sessionStorage - cleared when browser tab closes
    Session,
}

/// Browser storage interface.
///
/// In WASM, this uses actual localStorage/sessionStorage.
/// In tests/non-WASM, this uses a [`MemorySlot`].
#[derive(Debug)]
pub struct Storage {
    storage_type: StorageType,
    #[cfg(not(target_arch = "wasm32"))]
    memory: MemorySlot,
}

impl Default for Storage {
    fn default() -> Self {
        Self::new(StorageType::Local)
    }
}

impl Storage {
    /// Create a new storage instance.
    #[must_use]
    pub fn new(storage_type: StorageType) -> Self {
        Self {
            storage_type,
            #[cfg(not(target_arch = "wasm32"))]
            memory: MemorySlot::new(),
        }
    }

    /// Create localStorage instance.
    #[must_use]
    pub fn local() -> Self {
        Self::new(StorageType::Local)
    }

    /// Create sessionStorage instance.
    #[must_use]
    pub fn session() -> Self {
        Self::new(StorageType::Session)
    }

    /// Get the storage type.
    #[must_use]
    pub const fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    /// Get a value from storage.
    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        #[cfg(target_arch = "wasm32")]
        {
            self.get_wasm(key)
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.memory.read(key)
        }
    }

    /// Set a value in storage.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        #[cfg(target_arch = "wasm32")]
        {
            self.set_wasm(key, value)
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.memory.write(key, value)
        }
    }

    /// Remove a value from storage.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        #[cfg(target_arch = "wasm32")]
        {
            self.remove_wasm(key)
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            KeyValueSlot::remove(&self.memory, key)
        }
    }

    /// Get the number of items in storage.
    #[must_use]
    pub fn len(&self) -> usize {
        #[cfg(target_arch = "wasm32")]
        {
            self.len_wasm()
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.memory.len()
        }
    }

    /// Check if storage is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // WASM implementations
    #[cfg(target_arch = "wasm32")]
    fn get_storage(&self) -> Result<web_sys::Storage, StorageError> {
        let window = web_sys::window().ok_or(StorageError::NotAvailable)?;
        let storage = match self.storage_type {
            StorageType::Local => window.local_storage(),
            StorageType::Session => window.session_storage(),
        };
        // Browsers throw here when storage is disabled by policy.
        storage
            .map_err(|_| StorageError::AccessDenied)?
            .ok_or(StorageError::NotAvailable)
    }

    #[cfg(target_arch = "wasm32")]
    fn get_wasm(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.get_storage()?
            .get_item(key)
            .map_err(|_| StorageError::AccessDenied)
    }

    #[cfg(target_arch = "wasm32")]
    fn set_wasm(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.get_storage()?
            .set_item(key, value)
            .map_err(|_| StorageError::QuotaExceeded)
    }

    #[cfg(target_arch = "wasm32")]
    fn remove_wasm(&self, key: &str) -> Result<(), StorageError> {
        self.get_storage()?
            .remove_item(key)
            .map_err(|_| StorageError::AccessDenied)
    }

    #[cfg(target_arch = "wasm32")]
    fn len_wasm(&self) -> usize {
        self.get_storage()
            .ok()
            .and_then(|s| s.length().ok())
            .unwrap_or(0) as usize
    }
}

impl KeyValueSlot for Storage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.get(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        Self::remove(self, key)
    }
}
