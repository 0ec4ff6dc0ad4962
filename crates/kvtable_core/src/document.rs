//! Loading and persisting database documents.

use crate::config::Config;
use crate::error::CoreResult;
use crate::types::DatabaseDocument;
use kvtable_codec::{from_json_str, to_json_string, EncodeOptions};
use kvtable_storage::KeyValueStore;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;

/// Serializes a database document to the text stored under its key.
///
/// # Errors
///
/// Returns [`crate::CoreError::Codec`] if the document cannot be encoded.
pub fn encode_document(doc: &DatabaseDocument, options: &EncodeOptions) -> CoreResult<String> {
    Ok(to_json_string(doc, options)?)
}

/// Parses stored text back into a database document.
///
/// Both escaped and raw UTF-8 text are accepted.
///
/// # Errors
///
/// Returns [`crate::CoreError::Codec`] for malformed text.
pub fn decode_document(text: &str) -> CoreResult<DatabaseDocument> {
    Ok(from_json_str(text)?)
}

/// Reads and writes whole database documents through a key-value store.
///
/// Every mutation is a read-modify-write of one document. Without
/// [`Config::serialize_writes`] nothing prevents two overlapping cycles
/// on the same key from losing one of the writes.
pub(crate) struct DocumentStore {
    kv: Arc<dyn KeyValueStore>,
    config: Config,
    /// Per-key write locks, created lazily when `serialize_writes` is on.
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl DocumentStore {
    pub(crate) fn new(kv: Arc<dyn KeyValueStore>, config: Config) -> Self {
        Self {
            kv,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    /// Storage key of the database `name`.
    pub(crate) fn key_for(&self, name: &str) -> String {
        format!("{}{}", self.config.key_prefix, name)
    }

    /// Database name behind a storage key, if the key starts with the prefix.
    fn name_of<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.config.key_prefix.as_str())
    }

    pub(crate) async fn load(&self, key: &str) -> CoreResult<Option<DatabaseDocument>> {
        match self.kv.get_item(key).await? {
            Some(text) => decode_document(&text).map(Some),
            None => Ok(None),
        }
    }

    pub(crate) async fn persist(&self, key: &str, doc: &DatabaseDocument) -> CoreResult<()> {
        let options = EncodeOptions {
            escape_non_ascii: self.config.escape_non_ascii,
        };
        let text = encode_document(doc, &options)?;
        self.kv.set_item(key, &text).await?;
        tracing::trace!(key, bytes = text.len(), "persisted database document");
        Ok(())
    }

    pub(crate) async fn remove(&self, key: &str) -> CoreResult<()> {
        self.kv.remove_item(key).await?;
        Ok(())
    }

    /// Drops the write lock for `key` unless a writer holds or awaits it.
    ///
    /// Guards keep their lock alive, so a lock still in use stays in the
    /// map and later writers queue behind it instead of on a fresh one.
    pub(crate) fn release_lock(&self, key: &str) {
        let mut locks = self.locks.lock();
        if locks.get(key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(key);
        }
    }

    /// Key of the implicit current database.
    ///
    /// This is the first key, in the store's enumeration order, that
    /// contains the prefix anywhere in it.
    pub(crate) async fn first_database_key(&self) -> CoreResult<Option<String>> {
        let prefix = self.config.key_prefix.as_str();
        Ok(self
            .kv
            .all_keys()
            .await?
            .into_iter()
            .find(|key| key.contains(prefix)))
    }

    /// Names of all stored databases, in the store's enumeration order.
    pub(crate) async fn database_names(&self) -> CoreResult<Vec<String>> {
        Ok(self
            .kv
            .all_keys()
            .await?
            .iter()
            .filter_map(|key| self.name_of(key))
            .map(str::to_string)
            .collect())
    }

    /// Takes the write lock for `key` when writes are serialized.
    pub(crate) async fn write_guard(&self, key: &str) -> Option<OwnedMutexGuard<()>> {
        if !self.config.serialize_writes {
            return None;
        }
        let lock = Arc::clone(
            self.locks
                .lock()
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        );
        Some(lock.lock_owned().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::build_document;
    use crate::types::TableDef;
    use kvtable_storage::InMemoryStore;
    use std::time::Duration;

    fn store(config: Config) -> (Arc<InMemoryStore>, DocumentStore) {
        let kv = Arc::new(InMemoryStore::new());
        let docs = DocumentStore::new(kv.clone(), config);
        (kv, docs)
    }

    #[tokio::test]
    async fn persist_then_load() {
        let (kv, docs) = store(Config::default());
        let doc = build_document(&[TableDef::new("t", ["a"])]);
        let key = docs.key_for("shop");

        docs.persist(&key, &doc).await.unwrap();
        assert_eq!(key, "__db__shop");
        assert!(kv.get_item("__db__shop").await.unwrap().is_some());
        assert_eq!(docs.load(&key).await.unwrap(), Some(doc));
        assert_eq!(docs.load("__db__none").await.unwrap(), None);
    }

    #[test]
    fn non_ascii_document_round_trip() {
        let mut doc = build_document(&[TableDef::new("people", ["name"])]);
        let mut row = crate::types::Row::new();
        row.insert("name".into(), "Zoë 東京 🚀".into());
        doc.table_mut("people").unwrap().data.push(row);

        let escaped = encode_document(&doc, &EncodeOptions::ascii()).unwrap();
        assert!(escaped.is_ascii());
        assert_eq!(decode_document(&escaped).unwrap(), doc);

        let raw = encode_document(&doc, &EncodeOptions::utf8()).unwrap();
        assert!(raw.contains("Zoë"));
        assert_eq!(decode_document(&raw).unwrap(), doc);
    }

    #[tokio::test]
    async fn corrupt_document_is_codec_error() {
        let (kv, docs) = store(Config::default());
        kv.set_item("__db__bad", "{not json").await.unwrap();
        let err = docs.load("__db__bad").await.unwrap_err();
        assert!(matches!(err, crate::CoreError::Codec(_)));
    }

    #[tokio::test]
    async fn first_key_matches_prefix_anywhere() {
        let (kv, docs) = store(Config::default());
        kv.set_item("0-settings", "x").await.unwrap();
        kv.set_item("1:__db__main", "{}").await.unwrap();
        kv.set_item("__db__zzz", "{}").await.unwrap();

        assert_eq!(
            docs.first_database_key().await.unwrap().as_deref(),
            Some("1:__db__main")
        );
        assert_eq!(docs.database_names().await.unwrap(), vec!["zzz"]);
    }

    #[tokio::test]
    async fn no_lock_unless_serialized() {
        let (_, docs) = store(Config::default());
        assert!(docs.write_guard("k").await.is_none());

        let (_, docs) = store(Config::new().serialize_writes(true));
        let guard = docs.write_guard("k").await;
        assert!(guard.is_some());
        drop(guard);
        assert!(docs.write_guard("k").await.is_some());
    }

    #[tokio::test]
    async fn removal_keeps_lock_while_writers_wait() {
        let (_, docs) = store(Config::new().serialize_writes(true));
        let docs = Arc::new(docs);
        let key = "__db__k";

        let held = docs.write_guard(key).await.unwrap();
        let queued = tokio::spawn({
            let docs = Arc::clone(&docs);
            async move { docs.write_guard(key).await.is_some() }
        });
        tokio::task::yield_now().await;

        docs.remove(key).await.unwrap();
        docs.release_lock(key);
        assert!(docs.locks.lock().contains_key(key));

        let late = tokio::time::timeout(Duration::from_millis(50), docs.write_guard(key)).await;
        assert!(late.is_err(), "a new writer must wait for the held lock");

        drop(held);
        assert!(queued.await.unwrap());

        docs.release_lock(key);
        assert!(docs.locks.lock().is_empty());
    }
}
