//! Storage engine - configuration and coordination

mod engine;
mod flush;

pub use engine::{Engine, EngineStats};

use crate::wal::SyncPolicy;
use std::path::PathBuf;
use std::time::Duration;

/// Storage engine configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Filesystem path of the WAL
    pub wal_path: PathBuf,
    /// Directory for segment files
    pub segment_dir: PathBuf,
    /// Memtable size in bytes at which a flush is initiated
    pub flush_threshold: usize,
    /// Flush thread sleep between threshold checks
    pub poll_interval: Duration,
    /// Safety cap on tag length during WAL recovery
    pub max_tag_len: usize,
    /// WAL sync policy
    pub sync_policy: SyncPolicy,
    /// Periodic memtable overview logging
    pub debug: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            wal_path: PathBuf::from("data/data.wal"),
            segment_dir: PathBuf::from("data/sstables"),
            flush_threshold: crate::config::FLUSH_THRESHOLD,
            poll_interval: Duration::from_millis(crate::config::POLL_INTERVAL_MS),
            max_tag_len: crate::config::MAX_TAG_LEN,
            sync_policy: SyncPolicy::default(),
            debug: false,
        }
    }
}
