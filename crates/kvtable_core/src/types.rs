//! Document model: databases, tables and rows.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A row: field name to arbitrary JSON value.
///
/// Rows carry no primary key. Update and delete find a row by comparing
/// its full canonical serialization, so two rows with identical content
/// cannot be told apart.
pub type Row = Map<String, Value>;

/// Field added to every inserted row.
pub const CREATED_AT: &str = "created_at";

/// Field added to every updated row.
pub const UPDATED_AT: &str = "updated_at";

/// A table definition passed to `create_database` / `add_tables`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    /// Table name.
    pub name: String,
    /// Declared field names, in order.
    pub columns: Vec<String>,
}

impl TableDef {
    /// Creates a table definition.
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// A stored table: name, declared fields and rows in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name, unique within its database.
    pub name: String,
    /// Declared field names, unique and ordered.
    pub fields: Vec<String>,
    /// Rows, append-only in insertion order.
    pub data: Vec<Row>,
}

impl TableSchema {
    /// Builds an empty table from a definition, dropping repeated columns.
    pub fn from_def(def: &TableDef) -> Self {
        let mut fields: Vec<String> = Vec::with_capacity(def.columns.len());
        for column in &def.columns {
            if !fields.contains(column) {
                fields.push(column.clone());
            }
        }

        Self {
            name: def.name.clone(),
            fields,
            data: Vec::new(),
        }
    }

    /// Returns true if `field` is declared on this table.
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
}

/// The whole persisted state of one named database.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DatabaseDocument {
    /// Tables in creation order.
    pub tables: Vec<TableSchema>,
}

impl DatabaseDocument {
    /// Returns the table named `name`.
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Returns the table named `name` mutably.
    pub fn table_mut(&mut self, name: &str) -> Option<&mut TableSchema> {
        self.tables.iter_mut().find(|t| t.name == name)
    }

    /// Returns true if a table named `name` exists.
    pub fn has_table(&self, name: &str) -> bool {
        self.table(name).is_some()
    }
}

/// Result of a `select`.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// The matching rows, filtered and sorted.
    Rows(Vec<Row>),
    /// The first matching row of a `fetch` query, if any.
    One(Option<Row>),
    /// The order-by direction was not recognised.
    Undefined,
}

impl Selection {
    /// Returns the row list, or `None` for single-row and undefined results.
    pub fn into_rows(self) -> Option<Vec<Row>> {
        match self {
            Self::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    /// Returns the fetched row for a `fetch` query.
    pub fn into_one(self) -> Option<Row> {
        match self {
            Self::One(row) => row,
            _ => None,
        }
    }

    /// Returns true if the order-by direction was not recognised.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Converts the result into a JSON value.
    ///
    /// `Rows` becomes an array, `One` becomes the row or `null`, and
    /// `Undefined` becomes `None`.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Rows(rows) => Some(Value::Array(rows.into_iter().map(Value::Object).collect())),
            Self::One(row) => Some(row.map_or(Value::Null, Value::Object)),
            Self::Undefined => None,
        }
    }
}
