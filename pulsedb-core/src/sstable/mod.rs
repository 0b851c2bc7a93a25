//! Segment files ("sorted tag tables")
//!
//! A segment is the immutable artifact of one memtable flush: a bare
//! concatenation of per-tag blocks, one block per non-empty series, in tag
//! order. Per block, little-endian:
//!
//! - 8 bytes: tag length
//! - N bytes: tag
//! - 8 bytes: sample count
//! - 8 bytes: compressed payload length
//! - M bytes: Gorilla payload
//!
//! There is no file header, footer, or index; the file ends at EOF and
//! readers skip non-matching tags by seeking over the payload.

mod builder;
mod reader;

pub use builder::SstableBuilder;
pub use reader::find_series;

use std::path::{Path, PathBuf};

/// Path of segment `id` inside `dir`
pub fn segment_path(dir: &Path, id: u32) -> PathBuf {
    dir.join(format!("sstable_{}.db", id))
}

/// Parse a batch id out of a `sstable_<id>.db` file name
pub fn parse_segment_id(name: &str) -> Option<u32> {
    name.strip_prefix("sstable_")?
        .strip_suffix(".db")?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_naming() {
        let path = segment_path(Path::new("/data"), 7);
        assert_eq!(path, Path::new("/data/sstable_7.db"));

        assert_eq!(parse_segment_id("sstable_7.db"), Some(7));
        assert_eq!(parse_segment_id("sstable_123.db"), Some(123));
        assert_eq!(parse_segment_id("sstable_.db"), None);
        assert_eq!(parse_segment_id("sstable_7.tmp"), None);
        assert_eq!(parse_segment_id("wal_7.db"), None);
    }
}
