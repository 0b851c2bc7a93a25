//! WAL record layout

use crate::{Sample, Timestamp};
use bytes::{BufMut, Bytes, BytesMut};

/// One accepted sample as it appears in the log
///
/// On-disk layout, little-endian, no framing beyond the length prefix:
///
/// - 8 bytes: tag length
/// - N bytes: tag
/// - 8 bytes: timestamp (ms)
/// - 8 bytes: value bits
#[derive(Debug, Clone, PartialEq)]
pub struct WalRecord {
    /// Series identity
    pub tag: String,
    /// The accepted sample
    pub sample: Sample,
}

impl WalRecord {
    /// Create a record for one sample
    pub fn new(tag: impl Into<String>, time_ms: Timestamp, value: f64) -> Self {
        Self {
            tag: tag.into(),
            sample: Sample::new(time_ms, value),
        }
    }

    /// Serialize the record for appending
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(8 + self.tag.len() + 16);

        buf.put_u64_le(self.tag.len() as u64);
        buf.put_slice(self.tag.as_bytes());
        buf.put_i64_le(self.sample.time_ms);
        buf.put_f64_le(self.sample.value);

        buf.freeze()
    }
}
