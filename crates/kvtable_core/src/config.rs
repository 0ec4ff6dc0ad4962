//! Store configuration.

use crate::clock::{Clock, SystemClock};
use std::sync::Arc;

/// Prefix that marks a storage key as a kvtable database.
pub const DEFAULT_KEY_PREFIX: &str = "__db__";

/// Configuration for a [`crate::Store`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Prefix prepended to a database name to form its storage key.
    ///
    /// Implicit record operations also use it to discover the current
    /// database: the first stored key containing the prefix wins.
    pub key_prefix: String,

    /// Write documents as pure ASCII JSON (non-ASCII characters escaped).
    pub escape_non_ascii: bool,

    /// Hold a per-database lock around every read-modify-write cycle.
    ///
    /// When disabled, two overlapping writes to the same database can
    /// race and the later write silently discards the earlier one.
    pub serialize_writes: bool,

    /// Clock used for `created_at` / `updated_at`.
    pub clock: Arc<dyn Clock>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            escape_non_ascii: true,
            serialize_writes: false,
            clock: Arc::new(SystemClock),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the storage key prefix.
    #[must_use]
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Sets whether stored documents escape non-ASCII characters.
    #[must_use]
    pub fn escape_non_ascii(mut self, value: bool) -> Self {
        self.escape_non_ascii = value;
        self
    }

    /// Sets whether writes to the same database are serialized.
    #[must_use]
    pub fn serialize_writes(mut self, value: bool) -> Self {
        self.serialize_writes = value;
        self
    }

    /// Sets the clock used for row timestamps.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
