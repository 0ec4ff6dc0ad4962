//! Cross-crate integration test helpers.
//!
//! [`ModelHarness`] drives a real [`Store`](kvtable_core::Store) and a
//! plain `Vec<Row>` model side by side, so tests can check every stored
//! table against an obviously-correct reference.

use crate::fixtures::{TestStore, FIXED_TIMESTAMP};
use kvtable_core::{
    canonical_row, Row, TableDef, WhereStatement, CREATED_AT, UPDATED_AT,
};
use serde_json::Value;

/// A harness that mirrors one table in memory.
pub struct ModelHarness {
    /// The store under test.
    pub test: TestStore,
    table: String,
    model: Vec<Row>,
}

impl ModelHarness {
    /// Name of the database the harness creates.
    pub const DATABASE: &'static str = "model";

    /// Creates a harness over a memory store with one table.
    pub async fn new(def: TableDef) -> Self {
        Self::with_store(TestStore::memory(), def).await
    }

    /// Creates a harness over an existing (empty) test store.
    pub async fn with_store(test: TestStore, def: TableDef) -> Self {
        let table = def.name.clone();
        test.create_database(Self::DATABASE, &[def])
            .await
            .expect("Failed to create database");
        Self {
            test,
            table,
            model: Vec::new(),
        }
    }

    /// The expected rows.
    pub fn model(&self) -> &[Row] {
        &self.model
    }

    /// Inserts into both the store and the model.
    pub async fn insert(&mut self, values: Row) {
        self.test
            .insert(&self.table, values.clone())
            .await
            .expect("Failed to insert row");
        let mut stored = values;
        stored.insert(CREATED_AT.into(), Value::String(FIXED_TIMESTAMP.into()));
        self.model.push(stored);
    }

    /// Updates both the store and the model.
    pub async fn update(&mut self, values: Row, where_: &WhereStatement) {
        self.test
            .update(&self.table, values.clone(), where_)
            .await
            .expect("Failed to update rows");

        let mut values = values;
        values.insert(UPDATED_AT.into(), Value::String(FIXED_TIMESTAMP.into()));
        if !where_.is_targeted() {
            for row in &mut self.model {
                row.extend(values.clone());
            }
            return;
        }
        for mut snapshot in where_.apply(&self.model) {
            self.remove_one(&snapshot);
            snapshot.extend(values.clone());
            self.model.push(snapshot);
        }
    }

    /// Deletes from both the store and the model.
    pub async fn delete(&mut self, where_: &WhereStatement) {
        self.test
            .delete(&self.table, where_)
            .await
            .expect("Failed to delete rows");

        if !where_.is_targeted() {
            self.model.clear();
            return;
        }
        for snapshot in where_.apply(&self.model) {
            self.remove_one(&snapshot);
        }
    }

    fn remove_one(&mut self, target: &Row) {
        let key = canonical_row(target);
        if let Some(i) = self.model.iter().position(|r| canonical_row(r) == key) {
            self.model.remove(i);
        }
    }

    /// Asserts that the stored table equals the model, row by row.
    pub async fn verify(&self) {
        let stored = self
            .test
            .select(&self.table, None, None)
            .await
            .expect("Failed to select rows")
            .into_rows()
            .expect("Plain select returns rows");
        assert_eq!(stored, self.model, "stored table diverged from model");
    }
}
