//! # kvtable Storage
//!
//! Async key-value store trait and implementations for kvtable.
//!
//! This crate provides the lowest-level storage abstraction for kvtable.
//! Stores are **opaque string maps** - they do not interpret the values
//! they hold.
//!
//! ## Design Principles
//!
//! - Stores are simple string maps (list keys, get, set, remove)
//! - Every operation is atomic at single-key granularity
//! - No knowledge of database documents, tables or rows
//! - Must be `Send + Sync` so a store can be shared behind an `Arc`
//!
//! ## Available Stores
//!
//! - [`InMemoryStore`] - For testing and ephemeral storage
//! - [`FileStore`] - One file per key inside a locked directory
//!
//! ## Example
//!
//! ```rust
//! use kvtable_storage::{KeyValueStore, InMemoryStore};
//!
//! # tokio_test_block_on(async {
//! let store = InMemoryStore::new();
//! store.set_item("greeting", "hello world").await.unwrap();
//! let value = store.get_item("greeting").await.unwrap();
//! assert_eq!(value.as_deref(), Some("hello world"));
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::KeyValueStore;
pub use error::{StorageError, StorageResult};
pub use file::{FileStore, MAX_KEY_LEN};
pub use memory::InMemoryStore;
