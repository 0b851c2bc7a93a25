//! Engine façade - public operations and startup recovery

use super::flush::FlushCoordinator;
use super::StorageConfig;
use crate::memtable::MemTable;
use crate::sstable;
use crate::wal::{Wal, WalReader, WalRecord};
use crate::{Result, Sample, Timestamp};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{info, warn};

/// PulseDB storage engine
///
/// Owns the memtable, the WAL, and the background threads. Dropping the
/// engine signals shutdown, joins the threads (an in-progress flush runs
/// to completion), and closes the WAL - in that order.
pub struct Engine {
    memtable: Arc<MemTable>,
    wal: Arc<Wal>,
    next_batch_id: Arc<AtomicU32>,
    shutdown: Arc<AtomicBool>,
    flush_handle: Option<JoinHandle<()>>,
    reporter_handle: Option<JoinHandle<()>>,
}

impl Engine {
    /// Open the engine: prepare the segment directory, pick the next batch
    /// id, replay the WAL into a fresh memtable, start the flush thread
    pub fn open(config: StorageConfig) -> Result<Self> {
        fs::create_dir_all(&config.segment_dir)?;

        let next_batch_id = Arc::new(AtomicU32::new(next_batch_id(&config.segment_dir)?));
        let wal = Arc::new(Wal::open(&config.wal_path, config.sync_policy)?);
        let memtable = Arc::new(MemTable::new());

        let records = WalReader::new(&config.wal_path, config.max_tag_len).replay()?;
        if !records.is_empty() {
            info!(
                "Recovered {} samples from {:?}",
                records.len(),
                config.wal_path
            );
        }
        for record in records {
            memtable.insert(&record.tag, record.sample.time_ms, record.sample.value);
        }

        let shutdown = Arc::new(AtomicBool::new(false));

        let coordinator = FlushCoordinator {
            memtable: memtable.clone(),
            wal: wal.clone(),
            next_batch_id: next_batch_id.clone(),
            shutdown: shutdown.clone(),
            config: config.clone(),
        };
        let flush_handle = std::thread::Builder::new()
            .name("pulsedb-flush".into())
            .spawn(move || coordinator.run())?;

        let reporter_handle = if config.debug {
            Some(spawn_reporter(memtable.clone(), shutdown.clone())?)
        } else {
            None
        };

        Ok(Self {
            memtable,
            wal,
            next_batch_id,
            shutdown,
            flush_handle: Some(flush_handle),
            reporter_handle,
        })
    }

    /// Durably append one sample
    ///
    /// The WAL write happens first; on failure the sample is not inserted
    /// and the error is returned to the caller.
    pub fn append(&self, tag: &str, time_ms: Timestamp, value: f64) -> Result<()> {
        self.wal.append(&WalRecord::new(tag, time_ms, value))?;
        self.memtable.insert(tag, time_ms, value);
        Ok(())
    }

    /// Copy of the hot series for `tag`
    ///
    /// TODO: merge in flushed segments via `sstable::find_series`
    pub fn query(&self, tag: &str) -> Vec<Sample> {
        self.memtable.get(tag)
    }

    /// Tags currently present in the memtable
    pub fn list_tags(&self) -> Vec<String> {
        self.memtable.tags()
    }

    /// Point-in-time engine statistics
    pub fn stats(&self) -> EngineStats {
        let samples = self.memtable.total();
        EngineStats {
            memtable_samples: samples,
            memtable_bytes: samples * Sample::SIZE_BYTES,
            tags: self.memtable.tags().len(),
            next_batch_id: self.next_batch_id.load(Ordering::SeqCst),
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.flush_handle.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.reporter_handle.take() {
            let _ = handle.join();
        }
        if let Err(e) = self.wal.sync() {
            warn!("WAL sync on shutdown failed: {}", e);
        }
    }
}

/// Engine statistics
#[derive(Debug, Clone, Copy)]
pub struct EngineStats {
    pub memtable_samples: usize,
    pub memtable_bytes: usize,
    pub tags: usize,
    pub next_batch_id: u32,
}

/// Scan the segment directory and pick `max(existing ids) + 1`
fn next_batch_id(dir: &Path) -> Result<u32> {
    let mut max_id = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if let Some(id) = entry
            .file_name()
            .to_str()
            .and_then(sstable::parse_segment_id)
        {
            max_id = max_id.max(id);
        }
    }
    Ok(max_id + 1)
}

fn spawn_reporter(
    memtable: Arc<MemTable>,
    shutdown: Arc<AtomicBool>,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("pulsedb-report".into())
        .spawn(move || {
            while !shutdown.load(Ordering::SeqCst) {
                std::thread::sleep(Duration::from_secs(1));
                let tags = memtable.tags();
                info!("memtable: {} tags, {} samples", tags.len(), memtable.total());
            }
        })
}
