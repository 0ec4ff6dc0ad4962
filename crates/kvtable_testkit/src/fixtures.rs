//! Test fixtures and store helpers.
//!
//! Provides ready-made [`Store`]s over memory or temporary-directory
//! backends, plus a few populated scenarios.

use chrono::{NaiveDate, NaiveDateTime};
use kvtable_core::{Config, FixedClock, Row, Store, TableDef};
use kvtable_storage::{FileStore, InMemoryStore, KeyValueStore};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Timestamp every [`fixed_config`] store writes: 2020-02-11 19:58:41.000.
pub fn fixed_instant() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 2, 11)
        .and_then(|d| d.and_hms_opt(19, 58, 41))
        .expect("valid fixed instant")
}

/// The [`fixed_instant`] as stored in `created_at` / `updated_at`.
pub const FIXED_TIMESTAMP: &str = "2020-02-11T19:58:41.000Z";

/// Default configuration with a frozen clock.
pub fn fixed_config() -> Config {
    Config::new().clock(Arc::new(FixedClock(fixed_instant())))
}

/// A test store with automatic cleanup.
pub struct TestStore {
    /// The store under test.
    pub store: Store,
    kv: Arc<dyn KeyValueStore>,
    /// Kept alive so the directory outlives the file store.
    _temp_dir: Option<TempDir>,
}

impl TestStore {
    /// Creates a store over a fresh [`InMemoryStore`].
    pub fn memory() -> Self {
        Self::memory_with_config(fixed_config())
    }

    /// Creates a memory-backed store with a custom configuration.
    pub fn memory_with_config(config: Config) -> Self {
        let kv: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
        Self {
            store: Store::with_config(Arc::clone(&kv), config),
            kv,
            _temp_dir: None,
        }
    }

    /// Creates a store over a [`FileStore`] in a temporary directory.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let kv: Arc<dyn KeyValueStore> =
            Arc::new(FileStore::open(temp_dir.path()).expect("Failed to open file store"));
        Self {
            store: Store::with_config(Arc::clone(&kv), fixed_config()),
            kv,
            _temp_dir: Some(temp_dir),
        }
    }

    /// The raw key-value store, for inspecting stored documents.
    pub fn kv(&self) -> &Arc<dyn KeyValueStore> {
        &self.kv
    }

    /// Directory of a file-backed store, `None` in memory.
    pub fn path(&self) -> Option<&Path> {
        self._temp_dir.as_ref().map(TempDir::path)
    }

    /// Returns the stored text of database `name`.
    pub async fn raw_document(&self, name: &str) -> Option<String> {
        let key = format!("{}{}", self.store.config().key_prefix, name);
        self.kv.get_item(&key).await.expect("Failed to read document")
    }
}

impl std::ops::Deref for TestStore {
    type Target = Store;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Builds a row from a JSON object literal.
///
/// # Panics
///
/// Panics if `value` is not an object.
pub fn row(value: serde_json::Value) -> Row {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("row must be a JSON object, got {other}"),
    }
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use serde_json::json;

    /// Table definitions used by the scenarios: `items` and `tags`.
    pub fn catalog_defs() -> Vec<TableDef> {
        vec![
            TableDef::new("items", ["id", "name", "score", "tags"]),
            TableDef::new("tags", ["label"]),
        ]
    }

    /// Creates database `catalog` with `count` rows in `items`.
    ///
    /// Row `i` has `id = i`, `name = "item-i"` and `score = i % 5`.
    pub async fn populated_store(count: usize) -> TestStore {
        let test = TestStore::memory();
        test.create_database("catalog", &catalog_defs())
            .await
            .expect("Failed to create database");

        for i in 0..count {
            test.insert(
                "items",
                row(json!({"id": i, "name": format!("item-{i}"), "score": i % 5})),
            )
            .await
            .expect("Failed to insert row");
        }
        test
    }
}
