//! Segment builder for writing flushed series to disk

use crate::compression::GorillaEncoder;
use crate::{Result, Sample};
use bytes::{BufMut, BytesMut};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes per-tag blocks into a new segment file
pub struct SstableBuilder {
    file: BufWriter<File>,
    blocks: usize,
}

impl SstableBuilder {
    /// Create the segment file at `path`
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self {
            file: BufWriter::new(File::create(path)?),
            blocks: 0,
        })
    }

    /// Append one tag's series as a compressed block; empty series are
    /// skipped
    pub fn add_series(&mut self, tag: &str, samples: &[Sample]) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        let mut encoder = GorillaEncoder::new();
        for sample in samples {
            encoder.encode(sample.time_ms, sample.value);
        }
        let block = encoder.finish();

        let mut header = BytesMut::with_capacity(8 + tag.len() + 16);
        header.put_u64_le(tag.len() as u64);
        header.put_slice(tag.as_bytes());
        header.put_u64_le(block.count as u64);
        header.put_u64_le(block.data.len() as u64);

        self.file.write_all(&header)?;
        self.file.write_all(&block.data)?;
        self.blocks += 1;

        Ok(())
    }

    /// Flush and fsync the segment
    ///
    /// The WAL must not be truncated before this returns.
    pub fn finish(mut self) -> Result<usize> {
        self.file.flush()?;
        self.file.get_ref().sync_all()?;
        Ok(self.blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_series_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sstable_1.db");

        let mut builder = SstableBuilder::create(&path).unwrap();
        builder.add_series("empty", &[]).unwrap();
        assert_eq!(builder.finish().unwrap(), 0);

        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_block_layout() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sstable_1.db");

        let mut builder = SstableBuilder::create(&path).unwrap();
        builder
            .add_series("temp", &[Sample::new(1000, 23.5)])
            .unwrap();
        assert_eq!(builder.finish().unwrap(), 1);

        let bytes = std::fs::read(&path).unwrap();
        // header: tag_len | tag | count | payload_len, then a 16-byte
        // single-sample payload
        assert_eq!(bytes.len(), 8 + 4 + 8 + 8 + 16);
        assert_eq!(&bytes[0..8], &4u64.to_le_bytes());
        assert_eq!(&bytes[8..12], b"temp");
        assert_eq!(&bytes[12..20], &1u64.to_le_bytes());
        assert_eq!(&bytes[20..28], &16u64.to_le_bytes());
    }
}
