//! Row timestamps.
//!
//! Timestamps are the local wall-clock time written with a `Z` suffix,
//! e.g. `2024-03-01T14:05:09.120Z` at 14:05 local time regardless of the
//! host's UTC offset. Stored rows rely on this exact shape, so it is not
//! real UTC and must not be "corrected".

use chrono::{Duration, Local, NaiveDateTime};
use std::fmt;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current local time without offset information.
    fn now(&self) -> NaiveDateTime;
}

/// Reads the host clock in the local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant. Useful in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Formats a local time in the stored timestamp shape.
#[must_use]
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Returns the current timestamp from `clock`.
#[must_use]
pub fn timestamp(clock: &dyn Clock) -> String {
    format_timestamp(clock.now())
}

/// Returns the timestamp `minutes` from now (negative values go back).
///
/// `None` when the result falls outside the representable date range.
#[must_use]
pub fn timestamp_with_offset(clock: &dyn Clock, minutes: i64) -> Option<String> {
    Duration::try_minutes(minutes)
        .and_then(|offset| clock.now().checked_add_signed(offset))
        .map(format_timestamp)
}
