//! Store facade: schema and record operations over a key-value store.

use crate::clock::timestamp;
use crate::config::Config;
use crate::document::DocumentStore;
use crate::error::{CoreError, CoreResult};
use crate::query::{OrderByStatement, WhereStatement};
use crate::records;
use crate::schema;
use crate::types::{DatabaseDocument, Row, Selection, TableDef};
use kvtable_storage::KeyValueStore;
use std::fmt;
use std::sync::Arc;

/// Which database a record operation acts on.
#[derive(Debug, Clone, Copy)]
enum Target<'a> {
    /// The first stored key carrying the prefix.
    Current,
    /// A database addressed by name.
    Named(&'a str),
}

impl Target<'_> {
    fn not_found(self) -> CoreError {
        match self {
            Target::Current => CoreError::DatabaseNotFound { name: None },
            Target::Named(name) => CoreError::database_not_found(name),
        }
    }
}

/// Entry point for working with kvtable databases.
///
/// A `Store` wraps a [`KeyValueStore`] and keeps every database as one
/// JSON document under `key_prefix + name`. Each operation reloads the
/// document, so several `Store`s (or processes) may share the same
/// key-value store; writes from them are last-writer-wins.
///
/// Schema operations take the database name explicitly. Record operations
/// on `Store` act on the *current* database, which is the first key in
/// [`KeyValueStore::all_keys`] order containing the prefix. Use
/// [`Store::database`] to address a database by name instead.
///
/// Cloning a `Store` is cheap and clones share their write locks.
///
/// # Example
///
/// ```rust
/// use kvtable_core::{Store, TableDef, WhereStatement};
/// use kvtable_storage::InMemoryStore;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let store = Store::new(Arc::new(InMemoryStore::new()));
/// store
///     .create_database("shop", &[TableDef::new("items", ["name", "price"])])
///     .await?;
///
/// let row = json!({"name": "pen", "price": 2});
/// store.insert("items", row.as_object().unwrap().clone()).await?;
///
/// let cheap = store
///     .select("items", Some(&WhereStatement::lt("price", 5)), None)
///     .await?;
/// assert_eq!(cheap.into_rows().unwrap().len(), 1);
/// # Ok::<(), kvtable_core::CoreError>(())
/// # }).unwrap();
/// ```
#[derive(Clone)]
pub struct Store {
    docs: Arc<DocumentStore>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("config", self.docs.config())
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Creates a store with the default configuration.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_config(kv, Config::default())
    }

    /// Creates a store with a custom configuration.
    pub fn with_config(kv: Arc<dyn KeyValueStore>, config: Config) -> Self {
        Self {
            docs: Arc::new(DocumentStore::new(kv, config)),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        self.docs.config()
    }

    /// Returns a handle whose record operations act on the database `name`.
    ///
    /// The database does not have to exist yet; operations on the handle
    /// fail with [`CoreError::DatabaseNotFound`] until it does.
    pub fn database(&self, name: impl Into<String>) -> DatabaseHandle {
        DatabaseHandle {
            docs: Arc::clone(&self.docs),
            name: name.into(),
        }
    }

    // ---- schema ----

    /// Creates the database `name` with one empty table per definition.
    ///
    /// Returns `false`, leaving the stored document untouched, if the
    /// database already exists.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] for an empty name or an
    /// empty definition list.
    pub async fn create_database(&self, name: &str, defs: &[TableDef]) -> CoreResult<bool> {
        if name.is_empty() {
            return Err(CoreError::invalid_argument("database name must not be empty"));
        }
        if defs.is_empty() {
            return Err(CoreError::invalid_argument(
                "table definitions must not be empty",
            ));
        }

        let key = self.docs.key_for(name);
        let _guard = self.docs.write_guard(&key).await;
        if self.docs.load(&key).await?.is_some() {
            tracing::debug!(database = name, "database already exists");
            return Ok(false);
        }

        let doc = schema::build_document(defs);
        self.docs.persist(&key, &doc).await?;
        tracing::debug!(database = name, tables = doc.tables.len(), "created database");
        Ok(true)
    }

    /// Adds every table whose name is not taken yet.
    ///
    /// The document is written back even when nothing was added.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DatabaseNotFound`] if the database does not exist.
    pub async fn add_tables(&self, name: &str, defs: &[TableDef]) -> CoreResult<bool> {
        let added = self
            .modify(Target::Named(name), |doc| Ok(schema::add_tables(doc, defs)))
            .await?;
        tracing::debug!(database = name, added, "added tables");
        Ok(true)
    }

    /// Appends the fields the table does not declare yet.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DatabaseNotFound`] or [`CoreError::TableNotFound`].
    pub async fn add_fields<S>(&self, name: &str, table: &str, fields: &[S]) -> CoreResult<bool>
    where
        S: AsRef<str> + Sync,
    {
        let added = self
            .modify(Target::Named(name), |doc| {
                schema::add_fields(doc, table, fields)
            })
            .await?;
        tracing::debug!(database = name, table, added, "added fields");
        Ok(true)
    }

    /// Removes the database `name`. Removing a missing database is not an error.
    pub async fn delete_database(&self, name: &str) -> CoreResult<bool> {
        let key = self.docs.key_for(name);
        let guard = self.docs.write_guard(&key).await;
        self.docs.remove(&key).await?;
        drop(guard);
        self.docs.release_lock(&key);
        tracing::debug!(database = name, "deleted database");
        Ok(true)
    }

    /// Names of all stored databases, in key-value store order.
    pub async fn database_names(&self) -> CoreResult<Vec<String>> {
        self.docs.database_names().await
    }

    /// Loads the full document of the database `name`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DatabaseNotFound`] if the database does not exist.
    pub async fn describe(&self, name: &str) -> CoreResult<DatabaseDocument> {
        let key = self.docs.key_for(name);
        self.docs
            .load(&key)
            .await?
            .ok_or_else(|| CoreError::database_not_found(name))
    }

    // ---- records on the current database ----

    /// Appends a row to `table` of the current database.
    ///
    /// `created_at` is added to the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DatabaseNotFound`] when no database exists,
    /// [`CoreError::TableNotFound`], or [`CoreError::FieldNotFound`] naming
    /// the first undeclared key of `values`.
    pub async fn insert(&self, table: &str, values: Row) -> CoreResult<bool> {
        self.insert_into(Target::Current, table, values).await
    }

    /// Reads rows of `table` in the current database.
    ///
    /// See [`records::select`] for how `where_` and `order_by` combine.
    pub async fn select(
        &self,
        table: &str,
        where_: Option<&WhereStatement>,
        order_by: Option<&OrderByStatement>,
    ) -> CoreResult<Selection> {
        self.select_from(Target::Current, table, where_, order_by).await
    }

    /// Updates rows of `table` in the current database.
    ///
    /// With a targeted `where_` only matching rows change and they move to
    /// the end of the table. An untargeted statement updates every row.
    pub async fn update(
        &self,
        table: &str,
        values: Row,
        where_: &WhereStatement,
    ) -> CoreResult<bool> {
        self.update_in(Target::Current, table, values, where_).await
    }

    /// Deletes rows of `table` in the current database.
    ///
    /// An untargeted statement empties the table.
    pub async fn delete(&self, table: &str, where_: &WhereStatement) -> CoreResult<bool> {
        self.delete_from(Target::Current, table, where_).await
    }

    // ---- shared plumbing ----

    async fn resolve(&self, target: Target<'_>) -> CoreResult<String> {
        match target {
            Target::Named(name) => Ok(self.docs.key_for(name)),
            Target::Current => self
                .docs
                .first_database_key()
                .await?
                .ok_or_else(|| target.not_found()),
        }
    }

    /// One read-modify-write cycle. Nothing is written if `f` fails.
    async fn modify<T, F>(&self, target: Target<'_>, f: F) -> CoreResult<T>
    where
        F: FnOnce(&mut DatabaseDocument) -> CoreResult<T>,
    {
        let key = self.resolve(target).await?;
        let _guard = self.docs.write_guard(&key).await;

        let mut doc = self
            .docs
            .load(&key)
            .await?
            .ok_or_else(|| target.not_found())?;
        let out = f(&mut doc)?;
        self.docs.persist(&key, &doc).await?;
        Ok(out)
    }

    fn now(&self) -> String {
        timestamp(self.docs.config().clock.as_ref())
    }

    async fn insert_into(&self, target: Target<'_>, table: &str, values: Row) -> CoreResult<bool> {
        let ts = self.now();
        self.modify(target, |doc| records::insert(doc, table, values, ts))
            .await?;
        tracing::debug!(?target, table, "inserted row");
        Ok(true)
    }

    async fn select_from(
        &self,
        target: Target<'_>,
        table: &str,
        where_: Option<&WhereStatement>,
        order_by: Option<&OrderByStatement>,
    ) -> CoreResult<Selection> {
        let key = self.resolve(target).await?;
        let doc = self
            .docs
            .load(&key)
            .await?
            .ok_or_else(|| target.not_found())?;
        records::select(&doc, table, where_, order_by)
    }

    async fn update_in(
        &self,
        target: Target<'_>,
        table: &str,
        values: Row,
        where_: &WhereStatement,
    ) -> CoreResult<bool> {
        let ts = self.now();
        let matched = self
            .modify(target, |doc| records::update(doc, table, values, where_, ts))
            .await?;
        tracing::debug!(?target, table, matched, "updated rows");
        Ok(true)
    }

    async fn delete_from(
        &self,
        target: Target<'_>,
        table: &str,
        where_: &WhereStatement,
    ) -> CoreResult<bool> {
        let removed = self
            .modify(target, |doc| records::delete(doc, table, where_))
            .await?;
        tracing::debug!(?target, table, removed, "deleted rows");
        Ok(true)
    }
}

/// Record operations bound to one named database.
///
/// Obtained from [`Store::database`]. Shares configuration and write
/// locks with the store it came from.
#[derive(Clone)]
pub struct DatabaseHandle {
    docs: Arc<DocumentStore>,
    name: String,
}

impl fmt::Debug for DatabaseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseHandle")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl DatabaseHandle {
    /// Name of the bound database.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn store(&self) -> Store {
        Store {
            docs: Arc::clone(&self.docs),
        }
    }

    fn target(&self) -> Target<'_> {
        Target::Named(&self.name)
    }

    /// Returns true if the bound database is stored.
    pub async fn exists(&self) -> CoreResult<bool> {
        let key = self.docs.key_for(&self.name);
        Ok(self.docs.load(&key).await?.is_some())
    }

    /// Appends a row; see [`Store::insert`].
    pub async fn insert(&self, table: &str, values: Row) -> CoreResult<bool> {
        self.store().insert_into(self.target(), table, values).await
    }

    /// Reads rows; see [`Store::select`].
    pub async fn select(
        &self,
        table: &str,
        where_: Option<&WhereStatement>,
        order_by: Option<&OrderByStatement>,
    ) -> CoreResult<Selection> {
        self.store()
            .select_from(self.target(), table, where_, order_by)
            .await
    }

    /// Updates rows; see [`Store::update`].
    pub async fn update(
        &self,
        table: &str,
        values: Row,
        where_: &WhereStatement,
    ) -> CoreResult<bool> {
        self.store()
            .update_in(self.target(), table, values, where_)
            .await
    }

    /// Deletes rows; see [`Store::delete`].
    pub async fn delete(&self, table: &str, where_: &WhereStatement) -> CoreResult<bool> {
        self.store().delete_from(self.target(), table, where_).await
    }
}
