//! PulseDB Core - Single-Node Time-Series Storage Engine
//!
//! A storage engine for low- to mid-volume telemetry workloads (device
//! streams, sensor arrays) built around three tiers:
//!
//! - **WAL (Write-Ahead Log)**: every accepted sample is appended and synced
//!   to disk before it becomes visible, so a crash never loses acknowledged
//!   data
//! - **MemTable**: concurrent in-memory tag -> series buffer serving reads
//! - **Segments**: immutable on-disk files of Gorilla-compressed series,
//!   produced by a background flush thread once the memtable crosses a size
//!   threshold
//!
//! The [`storage::Engine`] façade ties the tiers together and owns the
//! background threads.

pub mod compression;
pub mod memtable;
pub mod sstable;
pub mod storage;
pub mod wal;

mod error;
mod types;

pub use error::{PulseError, Result};
pub use types::*;

/// PulseDB version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
pub mod config {
    /// Memtable size at which a flush is initiated (1 MiB)
    pub const FLUSH_THRESHOLD: usize = 1 << 20;

    /// Flush thread sleep between threshold checks (100 ms)
    pub const POLL_INTERVAL_MS: u64 = 100;

    /// Longest tag accepted during WAL recovery; anything larger is treated
    /// as a corrupt record
    pub const MAX_TAG_LEN: usize = 1024;
}
