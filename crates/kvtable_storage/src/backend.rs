//! Key-value store trait definition.

use crate::error::StorageResult;
use async_trait::async_trait;

/// An asynchronous key-value store for kvtable.
///
/// Stores are **opaque string maps**. kvtable owns the interpretation of
/// every value - stores do not understand documents, tables, or rows.
///
/// # Invariants
///
/// - `get_item` returns exactly the value last passed to `set_item` for that key
/// - `set_item` replaces any previous value atomically
/// - `remove_item` on a missing key is not an error
/// - `all_keys` returns every key currently present, each exactly once
/// - Stores must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryStore`] - For testing
/// - [`super::FileStore`] - For persistent storage
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns every key currently held by the store.
    ///
    /// The order is implementation defined but must be stable between calls
    /// that are not separated by a write. Both bundled stores return keys
    /// in ascending byte order.
    ///
    /// # Errors
    ///
    /// Returns an error if the key listing cannot be read.
    async fn all_keys(&self) -> StorageResult<Vec<String>>;

    /// Reads the value stored under `key`.
    ///
    /// Returns `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes `key` from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal fails. A missing key is not an error.
    async fn remove_item(&self, key: &str) -> StorageResult<()>;
}
