//! # kvtable Core
//!
//! Schema-on-write tables on top of an async key-value store.
//!
//! This crate provides:
//! - The document model: databases, tables, rows
//! - Schema operations: create databases, add tables and fields
//! - Record operations: insert, select, update, delete
//! - `where` filtering and `orderBy` sorting with loose JSON comparison
//! - The [`Store`] facade and named [`DatabaseHandle`]s
//!
//! Every database is a single JSON document stored under
//! `key_prefix + name`. Every call reads the whole document, changes it in
//! memory and writes it back.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod config;
mod database;
mod document;
mod error;
pub mod query;
pub mod records;
pub mod schema;
mod types;

pub use clock::{
    format_timestamp, timestamp, timestamp_with_offset, Clock, FixedClock, SystemClock,
};
pub use config::{Config, DEFAULT_KEY_PREFIX};
pub use database::{DatabaseHandle, Store};
pub use document::{decode_document, encode_document};
pub use error::{CoreError, CoreResult};
pub use query::{Comparison, Direction, OrderByStatement, WhereStatement};
pub use records::canonical_row;
pub use types::{
    DatabaseDocument, Row, Selection, TableDef, TableSchema, CREATED_AT, UPDATED_AT,
};

pub use kvtable_codec::EncodeOptions;
