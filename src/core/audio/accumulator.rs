//! Frame accumulation for streaming PCM16 audio
//!
//! Inbound audio arrives as arbitrarily-sized binary messages of raw
//! little-endian signed 16-bit mono samples. The accumulator buffers them and
//! hands out fixed-length analysis frames, normalized to `[-1.0, 1.0]`, which
//! is the format the STT engines consume.

use std::collections::VecDeque;

use crate::errors::EngineError;

/// Accumulates raw PCM16 samples and extracts fixed-size analysis frames.
///
/// One accumulator exists per connection and is owned exclusively by that
/// connection's pipeline; it is not safe for concurrent mutation.
pub struct FrameAccumulator {
    sample_rate: u32,
    chunk_size: usize,
    buffer: VecDeque<i16>,
}

impl FrameAccumulator {
    /// Create an accumulator producing frames of
    /// `sample_rate * chunk_duration_sec` samples.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfiguration` if `sample_rate` is zero or
    /// `chunk_duration_sec` is not positive.
    pub fn new(sample_rate: u32, chunk_duration_sec: f64) -> Result<Self, EngineError> {
        if sample_rate == 0 {
            return Err(EngineError::InvalidConfiguration(
                "sample_rate must be positive".to_string(),
            ));
        }
        if chunk_duration_sec <= 0.0 || !chunk_duration_sec.is_finite() {
            return Err(EngineError::InvalidConfiguration(
                "chunk_duration_sec must be positive".to_string(),
            ));
        }

        let chunk_size = (sample_rate as f64 * chunk_duration_sec) as usize;
        if chunk_size == 0 {
            return Err(EngineError::InvalidConfiguration(format!(
                "chunk of {chunk_duration_sec}s at {sample_rate}Hz rounds to zero samples"
            )));
        }

        Ok(Self {
            sample_rate,
            chunk_size,
            buffer: VecDeque::new(),
        })
    }

    /// Sample rate the accumulator was configured with, in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples per extracted frame.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of samples currently buffered.
    pub fn buffered_samples(&self) -> usize {
        self.buffer.len()
    }

    /// Decode `bytes` as little-endian i16 samples and append them in order.
    ///
    /// Empty input is a no-op. A trailing odd byte (half a sample) is ignored
    /// for this call.
    pub fn append(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }

        for pair in bytes.chunks_exact(2) {
            self.buffer.push_back(i16::from_le_bytes([pair[0], pair[1]]));
        }
    }

    /// Remove exactly one frame's worth of samples from the head of the
    /// buffer, in FIFO order, normalized by `sample / 32768.0`.
    ///
    /// Returns `None` until at least `chunk_size` samples are buffered; any
    /// remainder stays buffered for the next call.
    pub fn extract_frame(&mut self) -> Option<Vec<f32>> {
        if self.buffer.len() < self.chunk_size {
            return None;
        }

        let frame = self
            .buffer
            .drain(..self.chunk_size)
            .map(|sample| sample as f32 / 32768.0)
            .collect();

        Some(frame)
    }

    /// Discard all buffered samples unconditionally.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn test_rejects_zero_sample_rate() {
        assert!(matches!(
            FrameAccumulator::new(0, 1.0),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_rejects_non_positive_duration() {
        assert!(matches!(
            FrameAccumulator::new(16000, 0.0),
            Err(EngineError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            FrameAccumulator::new(16000, -1.0),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_chunk_size_is_rate_times_duration() {
        let acc = FrameAccumulator::new(16000, 1.0).unwrap();
        assert_eq!(acc.chunk_size(), 16000);

        let acc = FrameAccumulator::new(8000, 0.5).unwrap();
        assert_eq!(acc.chunk_size(), 4000);
    }

    #[test]
    fn test_extraction_waits_for_full_chunk() {
        // 16000Hz x 1.0s => 16000-sample chunks. 8000 + 8000 zero samples
        // should only produce a frame after the second append.
        let mut acc = FrameAccumulator::new(16000, 1.0).unwrap();

        acc.append(&pcm_bytes(&vec![0i16; 8000]));
        assert!(acc.extract_frame().is_none());

        acc.append(&pcm_bytes(&vec![0i16; 8000]));
        let frame = acc.extract_frame().expect("frame should be ready");
        assert_eq!(frame.len(), 16000);
        assert!(frame.iter().all(|&s| s == 0.0));
        assert_eq!(acc.buffered_samples(), 0);
    }

    #[test]
    fn test_fifo_order_and_remainder() {
        let mut acc = FrameAccumulator::new(4, 1.0).unwrap();
        acc.append(&pcm_bytes(&[1, 2, 3, 4, 5, 6]));

        let frame = acc.extract_frame().unwrap();
        assert_eq!(frame.len(), 4);
        assert_eq!(frame[0], 1.0 / 32768.0);
        assert_eq!(frame[3], 4.0 / 32768.0);

        // Samples 5 and 6 remain buffered for the next frame.
        assert_eq!(acc.buffered_samples(), 2);
        assert!(acc.extract_frame().is_none());
    }

    #[test]
    fn test_append_empty_is_noop() {
        let mut acc = FrameAccumulator::new(16000, 1.0).unwrap();
        acc.append(&[]);
        assert_eq!(acc.buffered_samples(), 0);
    }

    #[test]
    fn test_trailing_odd_byte_ignored() {
        let mut acc = FrameAccumulator::new(16000, 1.0).unwrap();
        let mut bytes = pcm_bytes(&[100, -100]);
        bytes.push(0x7f);
        acc.append(&bytes);
        assert_eq!(acc.buffered_samples(), 2);
    }

    #[test]
    fn test_reset_discards_partial_buffer() {
        let mut acc = FrameAccumulator::new(16000, 1.0).unwrap();
        acc.append(&pcm_bytes(&vec![42i16; 8000]));
        acc.reset();
        assert_eq!(acc.buffered_samples(), 0);

        // Post-reset, extraction still requires a full chunk from scratch.
        acc.append(&pcm_bytes(&vec![42i16; 8000]));
        assert!(acc.extract_frame().is_none());
    }

    #[test]
    fn test_normalization_range() {
        let mut acc = FrameAccumulator::new(2, 1.0).unwrap();
        acc.append(&pcm_bytes(&[i16::MIN, i16::MAX]));

        let frame = acc.extract_frame().unwrap();
        assert_eq!(frame[0], -1.0);
        // 32767/32768 < 1.0: positive full-scale never quite reaches 1.0.
        assert!(frame[1] < 1.0 && frame[1] > 0.9999);
    }

    #[test]
    fn test_amplitude_round_trip() {
        // round(x * 32768) recovers the original i16 for all values. The
        // known edge: -32768 maps to exactly -1.0 while +32767 maps just
        // short of 1.0, so the conversion is asymmetric at the boundary.
        for sample in [-32768i16, -32767, -1, 0, 1, 12345, 32767] {
            let normalized = sample as f32 / 32768.0;
            let recovered = (normalized * 32768.0).round() as i32;
            assert_eq!(recovered, sample as i32);
        }
    }
}
