//! Durable key-value storage for caller-local state.
//!
//! Values are whole strings, replaced wholesale on every write. Nothing here
//! knows about bookmarks; callers own their encoding and report
//! encoding failures through [`StorageError::Encode`].
//!
//! # Storage Layout
//!
//! ```text
//! ~/.studyhub/
//! └── storage/
//!     ├── bookmarks.json    # one file per key
//!     └── bookmarks.lock    # advisory writer lock
//! ```

pub mod file;
pub mod memory;

use thiserror::Error;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;

/// Errors raised by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("Storage lock poisoned")]
    Lock,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A string-valued key-value store
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` if nothing was ever written
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Keys map to file names, so only a conservative alphabet is accepted
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
