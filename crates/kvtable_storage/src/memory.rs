//! In-memory key-value store for testing.

use crate::backend::KeyValueStore;
use crate::error::StorageResult;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// An in-memory key-value store.
///
/// This store keeps every entry in a sorted map and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral databases that don't need persistence
///
/// Keys are returned by [`KeyValueStore::all_keys`] in ascending order.
///
/// # Thread Safety
///
/// This store is thread-safe and can be shared across tasks. The lock is
/// never held across an `.await`.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory store with pre-existing entries.
    ///
    /// Useful for testing how documents written elsewhere are read back.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Returns a copy of all entries.
    ///
    /// Useful for testing and debugging.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.read().clone()
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Clears all entries from the store.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn all_keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.entries.read().keys().cloned().collect())
    }

    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        tracing::trace!(key, len = value.len(), "memory store set");
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        tracing::trace!(key, "memory store remove");
        self.entries.write().remove(key);
        Ok(())
    }
}
