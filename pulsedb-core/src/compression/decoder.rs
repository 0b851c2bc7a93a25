//! Gorilla decoder for time-series decompression

use super::bitstream::BitReader;
use super::{FIRST_DELTA_BITS, LEADING_SENTINEL, MIN_DOD};
use crate::Sample;

/// Gorilla decoder for time-series data
///
/// The caller supplies the sample count; the decoder reads exactly that
/// many samples and mirrors the encoder's state machine bit for bit.
pub struct GorillaDecoder<'a> {
    reader: BitReader<'a>,
    count: usize,
    decoded: usize,

    // Timestamp state
    prev_timestamp: i64,
    prev_delta: i64,

    // Value state
    prev_value_bits: u64,
    prev_leading: u32,
    prev_meaningful: u32,
}

impl<'a> GorillaDecoder<'a> {
    /// Create a new decoder over `data` holding `count` samples
    pub fn new(data: &'a [u8], count: usize) -> Self {
        Self {
            reader: BitReader::new(data),
            count,
            decoded: 0,
            prev_timestamp: 0,
            prev_delta: 0,
            prev_value_bits: 0,
            prev_leading: LEADING_SENTINEL,
            prev_meaningful: 0,
        }
    }

    /// Decode all samples
    pub fn decode_all(&mut self) -> Vec<Sample> {
        let mut samples = Vec::with_capacity(self.count);
        while let Some(sample) = self.decode_next() {
            samples.push(sample);
        }
        samples
    }

    /// Decode the next sample, or `None` once `count` have been produced
    pub fn decode_next(&mut self) -> Option<Sample> {
        if self.decoded >= self.count {
            return None;
        }

        if self.decoded == 0 {
            self.prev_timestamp = self.reader.read_bits(64) as i64;
            self.prev_value_bits = self.reader.read_bits(64);
        } else if self.decoded == 1 {
            // The first delta is a fixed field with no control bit
            self.prev_delta = self.reader.read_bits(FIRST_DELTA_BITS) as i64;
            self.prev_timestamp += self.prev_delta;
            self.decode_value();
        } else {
            self.decode_timestamp();
            self.decode_value();
        }

        self.decoded += 1;
        Some(Sample::new(
            self.prev_timestamp,
            f64::from_bits(self.prev_value_bits),
        ))
    }

    fn decode_timestamp(&mut self) {
        if self.reader.read_bit() {
            let dod = if !self.reader.read_bit() {
                // '10' - 7-bit biased delta-of-delta
                self.reader.read_bits(7) as i64 + MIN_DOD
            } else {
                // '11' - 32-bit escape, sign-extended
                i64::from(self.reader.read_bits(32) as u32 as i32)
            };
            self.prev_delta += dod;
        }

        self.prev_timestamp += self.prev_delta;
    }

    fn decode_value(&mut self) {
        if !self.reader.read_bit() {
            // Value unchanged
            return;
        }

        if self.reader.read_bit() {
            // New window
            self.prev_leading = self.reader.read_bits(5) as u32;
            let meaningful = self.reader.read_bits(6) as u32;
            self.prev_meaningful = if meaningful == 0 { 64 } else { meaningful };
        }

        let bits = self.reader.read_bits(self.prev_meaningful as usize);
        let trailing = 64 - self.prev_leading - self.prev_meaningful;
        self.prev_value_bits ^= bits << trailing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::GorillaEncoder;

    fn roundtrip(samples: &[Sample]) -> Vec<Sample> {
        let mut encoder = GorillaEncoder::new();
        for sample in samples {
            encoder.encode(sample.time_ms, sample.value);
        }
        let block = encoder.finish();
        assert_eq!(block.count, samples.len());

        GorillaDecoder::new(&block.data, block.count).decode_all()
    }

    fn assert_bit_exact(original: &[Sample], decoded: &[Sample]) {
        assert_eq!(original.len(), decoded.len());
        for (i, (a, b)) in original.iter().zip(decoded.iter()).enumerate() {
            assert_eq!(a.time_ms, b.time_ms, "timestamp mismatch at {}", i);
            assert_eq!(
                a.value.to_bits(),
                b.value.to_bits(),
                "value mismatch at {}: {} vs {}",
                i,
                a.value,
                b.value
            );
        }
    }

    #[test]
    fn test_sensor_series_roundtrip() {
        let samples = vec![
            Sample::new(1000, 25.5),
            Sample::new(1100, 25.6),
            Sample::new(1200, 25.6),
            Sample::new(1300, 25.7),
        ];
        assert_bit_exact(&samples, &roundtrip(&samples));
    }

    #[test]
    fn test_single_sample_roundtrip() {
        let samples = vec![Sample::new(1_717_171_717_000, -273.15)];
        assert_bit_exact(&samples, &roundtrip(&samples));
    }

    #[test]
    fn test_two_samples_roundtrip() {
        let samples = vec![Sample::new(5000, 1.5), Sample::new(5250, 2.5)];
        assert_bit_exact(&samples, &roundtrip(&samples));
    }

    #[test]
    fn test_dod_seven_bit_boundaries() {
        // Deltas 100, 164, 101 give delta-of-deltas +64 and -63, the edges
        // of the short branch
        let samples = vec![
            Sample::new(0, 1.0),
            Sample::new(100, 2.0),
            Sample::new(264, 3.0),
            Sample::new(365, 4.0),
        ];
        assert_bit_exact(&samples, &roundtrip(&samples));
    }

    #[test]
    fn test_dod_32_bit_escape() {
        // Delta-of-deltas +900 and -950 overflow the 7-bit branch in both
        // directions
        let samples = vec![
            Sample::new(0, 1.0),
            Sample::new(100, 1.0),
            Sample::new(1100, 1.0),
            Sample::new(1150, 1.0),
        ];
        assert_bit_exact(&samples, &roundtrip(&samples));
    }

    #[test]
    fn test_repeated_timestamps() {
        let samples = vec![
            Sample::new(1000, 1.0),
            Sample::new(1000, 2.0),
            Sample::new(1000, 3.0),
        ];
        assert_bit_exact(&samples, &roundtrip(&samples));
    }

    #[test]
    fn test_special_values_roundtrip() {
        let values = [
            0.0,
            -0.0,
            f64::NAN,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::MIN_POSITIVE,
            5e-324, // smallest subnormal
            f64::MAX,
            f64::MIN,
        ];
        let samples: Vec<Sample> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Sample::new(1000 + i as i64 * 100, v))
            .collect();
        assert_bit_exact(&samples, &roundtrip(&samples));
    }

    #[test]
    fn test_full_width_xor_roundtrip() {
        // XOR of these bit patterns has no leading and no trailing zeros,
        // exercising the 64-wide window stored as 0 in the 6-bit field
        let samples = vec![
            Sample::new(0, 0.0),
            Sample::new(100, f64::from_bits(0x8000_0000_0000_0001)),
            Sample::new(200, 0.0),
        ];
        assert_bit_exact(&samples, &roundtrip(&samples));
    }

    #[test]
    fn test_long_leading_zero_run_roundtrip() {
        // XOR of adjacent representable values is a single low bit, so the
        // leading-zero count far exceeds the 5-bit field
        let samples = vec![
            Sample::new(0, 1.0),
            Sample::new(100, f64::from_bits(1.0f64.to_bits() + 1)),
            Sample::new(200, f64::from_bits(1.0f64.to_bits() + 3)),
        ];
        assert_bit_exact(&samples, &roundtrip(&samples));
    }

    #[test]
    fn test_window_reuse_path() {
        // Values whose XORs shrink into the previous window take the
        // reuse branch after the first window is established
        let samples = vec![
            Sample::new(0, 100.0),
            Sample::new(100, 104.0),
            Sample::new(200, 102.0),
            Sample::new(300, 103.0),
            Sample::new(400, 103.0),
            Sample::new(500, 101.0),
        ];
        assert_bit_exact(&samples, &roundtrip(&samples));
    }

    #[test]
    fn test_negative_timestamps() {
        let samples = vec![
            Sample::new(-5000, 1.0),
            Sample::new(-4900, 2.0),
            Sample::new(-4800, 3.0),
        ];
        assert_bit_exact(&samples, &roundtrip(&samples));
    }

    #[test]
    fn test_randomized_roundtrip() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(0x5eed);

        for &len in &[1usize, 2, 3, 17, 1000, 10_000] {
            let mut timestamp = rng.gen_range(0..1_000_000_000i64);
            let samples: Vec<Sample> = (0..len)
                .map(|_| {
                    // Non-decreasing, with the first gap inside the 14-bit
                    // field's range
                    timestamp += rng.gen_range(0..2000);
                    // Raw bit patterns cover NaN, infinities, subnormals
                    Sample::new(timestamp, f64::from_bits(rng.gen::<u64>()))
                })
                .collect();

            assert_bit_exact(&samples, &roundtrip(&samples));
        }
    }

    #[test]
    fn test_decode_stops_at_count() {
        let mut encoder = GorillaEncoder::new();
        for i in 0..10 {
            encoder.encode(i * 100, i as f64);
        }
        let block = encoder.finish();

        let mut decoder = GorillaDecoder::new(&block.data, 10);
        assert_eq!(decoder.decode_all().len(), 10);
        assert!(decoder.decode_next().is_none());
    }
}
