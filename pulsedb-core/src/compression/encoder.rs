//! Gorilla encoder for time-series compression

use super::bitstream::BitWriter;
use super::{CompressedBlock, FIRST_DELTA_BITS, LEADING_SENTINEL, MAX_DOD, MIN_DOD};

/// Gorilla encoder for time-series data
///
/// Samples are fed one at a time in timestamp order; `finish` yields the
/// packed bitstream. Every block starts with a cleared value window, so a
/// fresh encoder per series is the reset.
pub struct GorillaEncoder {
    writer: BitWriter,
    count: usize,

    // Timestamp state
    first_timestamp: i64,
    prev_timestamp: i64,
    prev_delta: i64,

    // Value state
    prev_value_bits: u64,
    prev_leading: u32,
    prev_meaningful: u32,
}

impl GorillaEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self {
            writer: BitWriter::with_capacity(4096),
            count: 0,
            first_timestamp: 0,
            prev_timestamp: 0,
            prev_delta: 0,
            prev_value_bits: 0,
            prev_leading: LEADING_SENTINEL,
            prev_meaningful: 0,
        }
    }

    /// Encode a timestamp-value pair
    pub fn encode(&mut self, timestamp: i64, value: f64) {
        match self.count {
            0 => self.encode_first(timestamp, value),
            1 => self.encode_second(timestamp, value),
            _ => {
                self.encode_timestamp(timestamp);
                self.encode_value(value);
            }
        }
        self.count += 1;
    }

    /// Finish encoding and return the compressed block
    pub fn finish(self) -> CompressedBlock {
        let last_timestamp = self.prev_timestamp;
        CompressedBlock {
            data: self.writer.finish(),
            count: self.count,
            first_timestamp: self.first_timestamp,
            last_timestamp,
        }
    }

    fn encode_first(&mut self, timestamp: i64, value: f64) {
        self.first_timestamp = timestamp;
        self.prev_timestamp = timestamp;

        // First sample is verbatim: 64 timestamp bits + 64 value bits
        self.writer.write_bits(timestamp as u64, 64);

        let value_bits = value.to_bits();
        self.writer.write_bits(value_bits, 64);
        self.prev_value_bits = value_bits;
    }

    fn encode_second(&mut self, timestamp: i64, value: f64) {
        // The first delta gets a fixed unsigned field with no control bit
        let delta = timestamp - self.prev_timestamp;
        self.writer.write_bits(delta as u64, FIRST_DELTA_BITS);

        self.prev_delta = delta;
        self.prev_timestamp = timestamp;
        self.encode_value(value);
    }

    fn encode_timestamp(&mut self, timestamp: i64) {
        let delta = timestamp - self.prev_timestamp;
        let dod = delta - self.prev_delta;

        // Steady streams repeat their delta, so the common case is one bit
        if dod == 0 {
            self.writer.write_bit(false);
        } else if (MIN_DOD..=MAX_DOD).contains(&dod) {
            // '10' + 7-bit biased delta-of-delta
            self.writer.write_bits(0b10, 2);
            self.writer.write_bits((dod - MIN_DOD) as u64, 7);
        } else {
            // '11' + 32-bit two's-complement escape
            self.writer.write_bits(0b11, 2);
            self.writer.write_bits(u64::from(dod as u32), 32);
        }

        self.prev_delta = delta;
        self.prev_timestamp = timestamp;
    }

    fn encode_value(&mut self, value: f64) {
        let value_bits = value.to_bits();
        let xor = value_bits ^ self.prev_value_bits;

        if xor == 0 {
            // Value unchanged, single '0' bit
            self.writer.write_bit(false);
            return;
        }
        self.writer.write_bit(true);

        // The leading-zero field is 5 bits wide
        let leading = xor.leading_zeros().min(31);
        let trailing = xor.trailing_zeros();
        let meaningful = 64 - leading - trailing;

        let reuse_window = self.prev_leading != LEADING_SENTINEL
            && leading >= self.prev_leading
            && trailing >= 64 - self.prev_leading - self.prev_meaningful;

        if reuse_window {
            self.writer.write_bit(false);
            let prev_trailing = 64 - self.prev_leading - self.prev_meaningful;
            self.writer
                .write_bits(xor >> prev_trailing, self.prev_meaningful as usize);
        } else {
            self.writer.write_bit(true);
            self.writer.write_bits(u64::from(leading), 5);
            // A full 64-bit window wraps to 0 in the 6-bit field; the
            // decoder maps it back (a changed value is never 0 bits wide)
            self.writer.write_bits(u64::from(meaningful & 0x3F), 6);
            self.writer.write_bits(xor >> trailing, meaningful as usize);

            self.prev_leading = leading;
            self.prev_meaningful = meaningful;
        }

        self.prev_value_bits = value_bits;
    }
}

impl Default for GorillaEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_single_sample() {
        let mut encoder = GorillaEncoder::new();
        encoder.encode(1_000_000_000, 23.5);
        let block = encoder.finish();

        assert_eq!(block.count, 1);
        assert_eq!(block.first_timestamp, 1_000_000_000);
        assert_eq!(block.last_timestamp, 1_000_000_000);
        // 64 + 64 bits verbatim
        assert_eq!(block.data.len(), 16);
    }

    #[test]
    fn test_encoder_constant_stream() {
        let mut encoder = GorillaEncoder::new();

        // Constant 100 ms cadence and constant value
        for i in 0..1000 {
            encoder.encode(1_000_000 + i * 100, 23.5);
        }

        let block = encoder.finish();
        assert_eq!(block.count, 1000);
        assert_eq!(block.last_timestamp, 1_000_000 + 999 * 100);

        // Steady-state samples cost two bits each
        let bytes_per_sample = block.bytes_per_sample();
        assert!(
            bytes_per_sample < 0.5,
            "expected < 0.5 bytes/sample for constant data, got {}",
            bytes_per_sample
        );
    }

    #[test]
    fn test_encoder_varying_values() {
        let mut encoder = GorillaEncoder::new();

        for i in 0..1000 {
            let timestamp = 1_000_000 + i * 100;
            let value = 20.0 + (i as f64 * 0.1).sin() * 5.0;
            encoder.encode(timestamp, value);
        }

        let block = encoder.finish();
        assert_eq!(block.count, 1000);

        let bytes_per_sample = block.bytes_per_sample();
        assert!(
            bytes_per_sample < 16.0,
            "expected better than raw, got {}",
            bytes_per_sample
        );
    }
}
