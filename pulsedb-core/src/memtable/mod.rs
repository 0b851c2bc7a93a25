//! MemTable implementation
//!
//! The MemTable is the hot tier: a concurrent tag -> series map holding
//! recent samples until the flush coordinator moves them into a segment
//! file. A single-writer / multi-reader lock guards the map; a separate
//! atomic sample counter lets the flush thread poll the size without
//! touching the lock.

use crate::{Sample, Table, Timestamp};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory tag -> series buffer
pub struct MemTable {
    table: RwLock<Table>,
    total_count: AtomicUsize,
}

impl MemTable {
    /// Create an empty MemTable
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table::new()),
            total_count: AtomicUsize::new(0),
        }
    }

    /// Append a sample to the series for `tag`, creating it if absent
    pub fn insert(&self, tag: &str, time_ms: Timestamp, value: f64) {
        let sample = Sample::new(time_ms, value);

        let mut table = self.table.write();
        match table.get_mut(tag) {
            Some(series) => series.push(sample),
            None => {
                table.insert(tag.to_string(), vec![sample]);
            }
        }
        self.total_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of samples buffered for `tag`
    pub fn count(&self, tag: &str) -> usize {
        self.table.read().get(tag).map_or(0, Vec::len)
    }

    /// Total buffered samples across all tags; lock-free
    pub fn total(&self) -> usize {
        self.total_count.load(Ordering::Relaxed)
    }

    /// Snapshot of the current tag names, in order
    pub fn tags(&self) -> Vec<String> {
        self.table.read().keys().cloned().collect()
    }

    /// Copy of the series for `tag`; empty when the tag is unknown
    pub fn get(&self, tag: &str) -> Vec<Sample> {
        self.table.read().get(tag).cloned().unwrap_or_default()
    }

    /// Move the entire table out, leaving the MemTable empty
    ///
    /// The linearization point of a flush: samples are either in the
    /// returned snapshot or in the (now empty) table, never both.
    pub fn extract(&self) -> Table {
        let mut table = self.table.write();
        self.total_count.store(0, Ordering::Relaxed);
        std::mem::take(&mut *table)
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl Default for MemTable {
    fn default() -> Self {
        Self::new()
    }
}
