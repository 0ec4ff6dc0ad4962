//! # kvtable Testkit
//!
//! Test utilities for kvtable.
//!
//! This crate provides:
//! - Test fixtures over memory and temporary-directory stores
//! - Property-based test generators using proptest
//! - A model-checking harness for record operations
//! - Tracing setup for tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kvtable_testkit::prelude::*;
//!
//! #[tokio::test]
//! async fn insert_then_select() {
//!     let test = scenarios::populated_store(3).await;
//!     let rows = test.select("items", None, None).await.unwrap();
//!     // ...
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod integration;
pub mod logging;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
    pub use crate::logging::*;
}

pub use fixtures::*;
pub use generators::*;
pub use integration::*;
pub use logging::*;
