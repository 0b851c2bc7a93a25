//! WAL writer implementation

use super::{SyncPolicy, WalRecord};
use crate::Result;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Append-only WAL over a single file
///
/// Appends from different threads are serialized through the internal
/// mutex; the on-disk record order matches the serialized order.
pub struct Wal {
    path: PathBuf,
    sync_policy: SyncPolicy,
    inner: Mutex<WalInner>,
}

struct WalInner {
    file: BufWriter<File>,
    writes_since_sync: usize,
    last_sync: Instant,
}

impl Wal {
    /// Open the log at `path` in append mode, creating it if needed
    pub fn open(path: impl Into<PathBuf>, sync_policy: SyncPolicy) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            sync_policy,
            inner: Mutex::new(WalInner {
                file: BufWriter::new(file),
                writes_since_sync: 0,
                last_sync: Instant::now(),
            }),
        })
    }

    /// Append one record; the OS file buffer is flushed before returning
    ///
    /// A failure here means the sample is not durable and must not be
    /// inserted into the memtable.
    pub fn append(&self, record: &WalRecord) -> Result<()> {
        let encoded = record.encode();
        let mut inner = self.inner.lock();

        inner.file.write_all(&encoded)?;
        inner.file.flush()?;
        inner.writes_since_sync += 1;

        if self.should_sync(&inner) {
            inner.file.get_ref().sync_all()?;
            inner.writes_since_sync = 0;
            inner.last_sync = Instant::now();
        }

        Ok(())
    }

    /// Force sync to disk
    pub fn sync(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.file.flush()?;
        inner.file.get_ref().sync_all()?;
        inner.writes_since_sync = 0;
        inner.last_sync = Instant::now();
        Ok(())
    }

    /// Truncate the log after a successful flush
    ///
    /// Appends block on the mutex until the truncated file is reopened.
    pub fn reset(&self) -> Result<()> {
        let mut inner = self.inner.lock();

        inner.file.flush()?;
        inner.file = BufWriter::new(File::create(&self.path)?);
        inner.writes_since_sync = 0;
        inner.last_sync = Instant::now();

        Ok(())
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn should_sync(&self, inner: &WalInner) -> bool {
        match self.sync_policy {
            SyncPolicy::Immediate => true,
            SyncPolicy::EveryN(n) => inner.writes_since_sync >= n,
            SyncPolicy::Interval { millis } => {
                inner.last_sync.elapsed().as_millis() >= u128::from(millis)
            }
            SyncPolicy::None => false,
        }
    }
}
