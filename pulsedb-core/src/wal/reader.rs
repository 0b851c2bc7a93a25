//! WAL reader for recovery

use super::WalRecord;
use crate::{Result, Sample};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::PathBuf;
use tracing::{info, warn};

/// WAL reader for recovering records after a restart
pub struct WalReader {
    path: PathBuf,
    max_tag_len: usize,
}

impl WalReader {
    /// Create a reader for the log at `path`
    ///
    /// `max_tag_len` caps the tag length; a record claiming more is
    /// treated as a corrupt tail.
    pub fn new(path: impl Into<PathBuf>, max_tag_len: usize) -> Self {
        Self {
            path: path.into(),
            max_tag_len,
        }
    }

    /// Stream records out of the log until EOF or a corrupt tail
    ///
    /// Corruption is absorbed: the records before the offending one are
    /// returned and the rest of the file is ignored.
    pub fn replay(&self) -> Result<Vec<WalRecord>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No WAL found at {:?}", self.path);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut reader = BufReader::new(file);
        let mut records = Vec::new();

        loop {
            let mut len_buf = [0u8; 8];
            match fill(&mut reader, &mut len_buf)? {
                0 => break, // clean EOF at a record boundary
                n if n < len_buf.len() => {
                    warn!("Truncated record length in {:?}, dropping tail", self.path);
                    break;
                }
                _ => {}
            }

            let tag_len = u64::from_le_bytes(len_buf) as usize;
            if tag_len > self.max_tag_len {
                warn!(
                    "Implausible tag length {} in {:?}, dropping tail",
                    tag_len, self.path
                );
                break;
            }

            let mut tag_buf = vec![0u8; tag_len];
            if fill(&mut reader, &mut tag_buf)? < tag_len {
                warn!("Truncated tag in {:?}, dropping tail", self.path);
                break;
            }
            let tag = match String::from_utf8(tag_buf) {
                Ok(tag) => tag,
                Err(_) => {
                    warn!("Non-UTF-8 tag in {:?}, dropping tail", self.path);
                    break;
                }
            };

            let mut field_buf = [0u8; 8];
            if fill(&mut reader, &mut field_buf)? < field_buf.len() {
                warn!("Truncated timestamp in {:?}, dropping tail", self.path);
                break;
            }
            let time_ms = i64::from_le_bytes(field_buf);

            if fill(&mut reader, &mut field_buf)? < field_buf.len() {
                warn!("Truncated value in {:?}, dropping tail", self.path);
                break;
            }
            let value = f64::from_le_bytes(field_buf);

            records.push(WalRecord {
                tag,
                sample: Sample::new(time_ms, value),
            });
        }

        Ok(records)
    }
}

/// Read up to `buf.len()` bytes, returning how many were available
fn fill(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
