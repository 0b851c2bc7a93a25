//! Gorilla compression for time-series data
//!
//! Implements the compression algorithm from Facebook's paper:
//! "Gorilla: A Fast, Scalable, In-Memory Time Series Database"
//!
//! Timestamps are delta-of-delta encoded, values are XOR encoded against
//! the previous value's bit pattern. The decoder must be told how many
//! samples a bitstream holds; the segment block header carries that count.

mod bitstream;
mod decoder;
mod encoder;

pub use bitstream::{BitReader, BitWriter};
pub use decoder::GorillaDecoder;
pub use encoder::GorillaEncoder;

/// Width of the fixed field holding the delta between the first two
/// timestamps. Gaps that do not fit are outside the format's contract.
pub(crate) const FIRST_DELTA_BITS: usize = 14;

/// Delta-of-delta range covered by the short `10` branch; anything outside
/// takes the 32-bit two's-complement escape.
pub(crate) const MIN_DOD: i64 = -63;
pub(crate) const MAX_DOD: i64 = 64;

/// Marks the value window as never written.
pub(crate) const LEADING_SENTINEL: u32 = u32::MAX;

/// Compressed block of time-series data
#[derive(Debug, Clone)]
pub struct CompressedBlock {
    /// Compressed data
    pub data: Vec<u8>,
    /// Number of samples
    pub count: usize,
    /// First timestamp in block
    pub first_timestamp: i64,
    /// Last timestamp in block
    pub last_timestamp: i64,
}

impl CompressedBlock {
    /// Get bytes per sample
    pub fn bytes_per_sample(&self) -> f64 {
        self.data.len() as f64 / self.count as f64
    }
}
