//! Core types for PulseDB

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Timestamp in milliseconds since Unix epoch
pub type Timestamp = i64;

/// A single unit of time-series data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Caller-supplied millisecond timestamp
    pub time_ms: Timestamp,
    /// Measured value, stored bit-exact
    pub value: f64,
}

impl Sample {
    /// In-memory size, used for the flush threshold arithmetic
    pub const SIZE_BYTES: usize = std::mem::size_of::<Self>();

    /// Create a new sample
    pub fn new(time_ms: Timestamp, value: f64) -> Self {
        Self { time_ms, value }
    }
}

/// Mapping of tag -> series, as held by the memtable and handed to the
/// flush coordinator by `extract`
pub type Table = BTreeMap<String, Vec<Sample>>;
