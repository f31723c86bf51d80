//! Durable key-value text storage.
//!
//! Both the session record and the image associations are persisted through
//! [`LocalStorage`]. Values are opaque text, every write replaces the whole value.

mod memory_storage;
mod sqlite_storage;
mod versioned_schema;

pub use memory_storage::InMemoryStorage;
pub use sqlite_storage::SqliteLocalStorage;

use thiserror::Error;

/// Key holding the bearer token of the current session.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Key holding the `{ username, role }` record of the current session.
pub const SESSION_USER_KEY: &str = "user";

/// Key holding the serialized image association map.
pub const IMAGE_ASSOCIATIONS_KEY: &str = "carImagesData";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Failed to read {key}: {reason}")]
    Read { key: String, reason: String },

    #[error("Failed to write {key}: {reason}")]
    Write { key: String, reason: String },

    #[error("Failed to remove {key}: {reason}")]
    Remove { key: String, reason: String },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn is_write(&self) -> bool {
        matches!(self, StorageError::Write { .. })
    }
}

/// The value of an operation that went through, along with whether its local
/// save did. A failed save is not fatal: the value holds for the rest of the
/// run but will not be there after a restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saved<T> {
    pub value: T,
    pub persisted: Result<(), StorageError>,
}

impl<T> Saved<T> {
    pub fn new(value: T, persisted: Result<(), StorageError>) -> Self {
        Saved { value, persisted }
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted.is_ok()
    }

    /// The save failure, if any.
    pub fn warning(&self) -> Option<&StorageError> {
        self.persisted.as_ref().err()
    }
}

pub trait LocalStorage: Send + Sync {
    /// Returns Ok(None) if nothing is stored under `key`.
    fn read_text(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn write_text(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove_key(&self, key: &str) -> Result<(), StorageError>;
}
