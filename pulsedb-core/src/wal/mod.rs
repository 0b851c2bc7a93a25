//! Write-Ahead Log (WAL) implementation
//!
//! The WAL provides durability by writing every accepted sample to disk
//! before it is inserted into the memtable. After a crash, replaying the
//! log rebuilds the memtable. The log is truncated after each successful
//! flush, once the corresponding segment file is durable.

mod reader;
mod record;
mod writer;

pub use reader::WalReader;
pub use record::WalRecord;
pub use writer::Wal;

/// WAL sync policy
#[derive(Debug, Clone, Copy)]
pub enum SyncPolicy {
    /// Sync after every write (safest, slowest)
    Immediate,
    /// Sync after N writes
    EveryN(usize),
    /// Sync on interval (trades durability for performance)
    Interval { millis: u64 },
    /// Never sync (OS decides, fastest, least safe)
    None,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        SyncPolicy::Immediate
    }
}
