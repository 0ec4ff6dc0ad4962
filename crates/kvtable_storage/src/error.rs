//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The store directory is held by another process.
    #[error("store locked: another process has exclusive access to {path}")]
    Locked {
        /// The locked directory.
        path: String,
    },

    /// A stored value or file name could not be interpreted.
    #[error("storage corrupted: {0}")]
    Corrupted(String),

    /// The key cannot be stored by this backend.
    #[error("invalid key: {0}")]
    InvalidKey(String),
}
