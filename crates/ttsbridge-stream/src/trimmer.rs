//! Silence compression across chunk boundaries.
//!
//! Every silent run keeps its first `keep_samples` samples and drops the
//! rest. The run counter lives in the trimmer rather than in each call, so a
//! run split over several engine chunks is trimmed exactly as if it had
//! arrived in one piece.

use ttsbridge_core::settings::{DEFAULT_AMPLITUDE_THRESHOLD, DEFAULT_KEEP_MS};
use ttsbridge_core::{PCM16_BYTES_PER_SAMPLE, Settings};

/// Tuning for [`SilenceTrimmer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimmerConfig {
    /// Samples with an absolute value below this are silent.
    pub amplitude_threshold: i16,
    /// Silence kept at the onset of each run, in milliseconds.
    pub keep_ms: u32,
}

impl Default for TrimmerConfig {
    fn default() -> Self {
        Self {
            amplitude_threshold: DEFAULT_AMPLITUDE_THRESHOLD,
            keep_ms: DEFAULT_KEEP_MS,
        }
    }
}

impl TrimmerConfig {
    /// Derive the trimmer tuning from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            amplitude_threshold: settings.effective_amplitude_threshold(),
            keep_ms: settings.effective_keep_ms(),
        }
    }

    /// Pad length in samples at `sample_rate`, never less than one.
    pub fn keep_samples(&self, sample_rate: u32) -> u32 {
        let samples = u64::from(sample_rate) * u64::from(self.keep_ms) / 1000;
        u32::try_from(samples).unwrap_or(u32::MAX).max(1)
    }
}

/// Stateful per-utterance silence filter over PCM16 little-endian audio.
///
/// One instance belongs to one utterance and must see that utterance's
/// chunks in emission order.
#[derive(Debug)]
pub struct SilenceTrimmer {
    sample_rate: u32,
    threshold: u16,
    keep_samples: u32,
    consecutive_silent_samples: u32,
}

impl SilenceTrimmer {
    pub fn new(sample_rate: u32, config: TrimmerConfig) -> Self {
        Self {
            sample_rate,
            threshold: config.amplitude_threshold.max(0).unsigned_abs(),
            keep_samples: config.keep_samples(sample_rate),
            consecutive_silent_samples: 0,
        }
    }

    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub const fn keep_samples(&self) -> u32 {
        self.keep_samples
    }

    /// Length of the silent run seen so far, including dropped samples.
    pub const fn silent_run(&self) -> u32 {
        self.consecutive_silent_samples
    }

    /// Filter `input[..length]`, returning the kept samples as a new buffer.
    ///
    /// `length` is clamped to the input and rounded down to a whole sample.
    /// Returns `None` when every sample was dropped.
    pub fn filter(&mut self, input: &[u8], length: usize) -> Option<Vec<u8>> {
        let length = length.min(input.len());
        let mut out = Vec::with_capacity(length);

        for pair in input[..length].chunks_exact(PCM16_BYTES_PER_SAMPLE) {
            let sample = i16::from_le_bytes([pair[0], pair[1]]);
            if sample.unsigned_abs() < self.threshold {
                self.consecutive_silent_samples = self.consecutive_silent_samples.saturating_add(1);
                if self.consecutive_silent_samples <= self.keep_samples {
                    out.extend_from_slice(pair);
                }
            } else {
                self.consecutive_silent_samples = 0;
                out.extend_from_slice(pair);
            }
        }

        if out.is_empty() { None } else { Some(out) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcm;

    fn samples(value: i16, count: usize) -> Vec<u8> {
        std::iter::repeat_n(value.to_le_bytes(), count)
            .flatten()
            .collect()
    }

    fn trimmer(sample_rate: u32) -> SilenceTrimmer {
        SilenceTrimmer::new(sample_rate, TrimmerConfig::default())
    }

    #[test]
    fn keep_samples_is_derived_from_keep_ms() {
        assert_eq!(trimmer(16_000).keep_samples(), 4_800);
        assert_eq!(trimmer(24_000).keep_samples(), 7_200);
    }

    #[test]
    fn keep_samples_never_drops_to_zero() {
        let config = TrimmerConfig {
            amplitude_threshold: 700,
            keep_ms: 1,
        };
        assert_eq!(config.keep_samples(100), 1);
    }

    #[test]
    fn loud_buffer_passes_unchanged() {
        let input = samples(-12_000, 300);
        let out = trimmer(16_000).filter(&input, input.len()).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn silent_buffer_is_cut_to_the_pad() {
        let mut t = trimmer(16_000);
        let input = samples(10, 20_000);
        let out = t.filter(&input, input.len()).unwrap();
        assert_eq!(out.len(), 4_800 * 2);
        assert_eq!(out, input[..4_800 * 2]);
        assert_eq!(t.silent_run(), 20_000);
    }

    #[test]
    fn fully_dropped_chunk_returns_none() {
        let mut t = trimmer(16_000);
        let pad = samples(0, 4_800);
        assert!(t.filter(&pad, pad.len()).is_some());
        let more = samples(0, 100);
        assert!(t.filter(&more, more.len()).is_none());
    }

    #[test]
    fn loud_sample_resets_the_run() {
        let mut t = SilenceTrimmer::new(
            1_000,
            TrimmerConfig {
                amplitude_threshold: 700,
                keep_ms: 3,
            },
        );
        let mut input = samples(0, 5);
        input.extend(samples(800, 1));
        input.extend(samples(0, 5));

        let out = t.filter(&input, input.len()).unwrap();
        assert_eq!(
            pcm::decode(&out),
            vec![0, 0, 0, 800, 0, 0, 0],
            "each silent run keeps its own pad"
        );
    }

    #[test]
    fn threshold_is_exclusive_and_symmetric() {
        let mut t = SilenceTrimmer::new(
            1_000,
            TrimmerConfig {
                amplitude_threshold: 700,
                keep_ms: 1,
            },
        );
        let mut input = samples(699, 1);
        input.extend(samples(-699, 1));
        input.extend(samples(-700, 1));
        input.extend(samples(i16::MIN, 1));

        let out = t.filter(&input, input.len()).unwrap();
        assert_eq!(pcm::decode(&out), vec![699, -700, i16::MIN]);
    }

    #[test]
    fn trimming_is_invariant_to_chunk_boundaries() {
        let mut whole = samples(0, 3_000);
        whole.extend(samples(5_000, 40));
        whole.extend(samples(100, 9_000));
        whole.extend(samples(-3_000, 10));

        let expected = trimmer(16_000).filter(&whole, whole.len()).unwrap();

        for chunk_samples in [1_usize, 7, 512, 4_799, 4_800, 4_801] {
            let mut t = trimmer(16_000);
            let mut joined = Vec::new();
            for chunk in whole.chunks(chunk_samples * 2) {
                if let Some(kept) = t.filter(chunk, chunk.len()) {
                    joined.extend(kept);
                }
            }
            assert_eq!(joined, expected, "chunk size {chunk_samples}");
        }
    }

    #[test]
    fn odd_length_ignores_trailing_byte() {
        let input = samples(2_000, 3);
        let out = trimmer(16_000).filter(&input, 5).unwrap();
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn length_limits_the_filtered_prefix() {
        let mut input = samples(2_000, 2);
        input.extend(samples(-2_000, 2));
        let out = trimmer(16_000).filter(&input, 4).unwrap();
        assert_eq!(pcm::decode(&out), vec![2_000, 2_000]);
    }
}
