//! Error types for knapsnack-core.
//!
//! Wizard validation failures are not errors in this sense: they live in the
//! controller's `error` message. The enums here cover programming and I/O
//! faults at the crate boundaries.

use crate::form::FieldKey;
use thiserror::Error;

/// Errors raised when a field edit arrives from an untyped boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// The key does not name a form field.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// The value does not have the shape the field expects.
    #[error("invalid value for '{field}': {message}")]
    InvalidValue {
        /// Field being edited
        field: FieldKey,
        /// Deserializer message
        message: String,
    },

    /// The name does not identify a ratio channel.
    #[error("unknown ratio channel: {0}")]
    UnknownChannel(String),
}

/// Errors from a key-value slot backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Storage is not available (e.g., in incognito mode)
    #[error("storage not available")]
    NotAvailable,

    /// Storage quota exceeded
    #[error("storage quota exceeded")]
    QuotaExceeded,

    /// Access denied
    #[error("storage access denied")]
    AccessDenied,

    /// Backend I/O failure
    #[error("storage I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::PermissionDenied => Self::AccessDenied,
            _ => Self::Io(e.to_string()),
        }
    }
}

/// Errors building a step catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// A wizard needs at least one step.
    #[error("step catalog must contain at least one step")]
    Empty,
}
