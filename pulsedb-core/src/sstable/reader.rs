//! Segment lookup
//!
//! Cold reads are not yet merged into the engine's query path; this scan
//! is the standalone search routine over a sealed segment.

use crate::compression::GorillaDecoder;
use crate::{PulseError, Result, Sample};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

/// Scan a segment for `tag`, skipping non-matching blocks by their payload
/// length; `None` when the tag has no block in this segment
pub fn find_series(path: &Path, tag: &str) -> Result<Option<Vec<Sample>>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    loop {
        let mut len_buf = [0u8; 8];
        match reader.read_exact(&mut len_buf) {
            Ok(()) => {}
            // A segment ends at EOF; there is no footer to look for
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let tag_len = u64::from_le_bytes(len_buf) as usize;
        if tag_len > crate::config::MAX_TAG_LEN {
            return Err(PulseError::Corruption(format!(
                "segment block tag length {} exceeds maximum",
                tag_len
            )));
        }

        let mut tag_buf = vec![0u8; tag_len];
        reader.read_exact(&mut tag_buf).map_err(truncated)?;
        let block_tag = String::from_utf8(tag_buf)
            .map_err(|e| PulseError::InvalidFormat(format!("segment block tag: {}", e)))?;

        reader.read_exact(&mut len_buf).map_err(truncated)?;
        let count = u64::from_le_bytes(len_buf) as usize;

        reader.read_exact(&mut len_buf).map_err(truncated)?;
        let payload_len = u64::from_le_bytes(len_buf) as usize;

        if block_tag == tag {
            let mut payload = vec![0u8; payload_len];
            reader.read_exact(&mut payload).map_err(truncated)?;
            return Ok(Some(GorillaDecoder::new(&payload, count).decode_all()));
        }

        // Jump over this block to the next tag
        reader.seek_relative(payload_len as i64)?;
    }
}

fn truncated(e: std::io::Error) -> PulseError {
    if e.kind() == ErrorKind::UnexpectedEof {
        PulseError::Corruption("truncated segment block".into())
    } else {
        e.into()
    }
}
