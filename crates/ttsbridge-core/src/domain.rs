//! Request and stream-format types.
//!
//! These are pure domain types with no infrastructure dependencies.

use serde::{Deserialize, Serialize};

/// Bytes per PCM16 sample.
pub const PCM16_BYTES_PER_SAMPLE: usize = 2;

/// Sample encoding of the byte stream handed to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SampleEncoding {
    /// Signed 16-bit little-endian.
    #[default]
    Pcm16Le,
}

/// Format announced to a sink before any audio is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFormat {
    /// Samples per second, as reported by the engine.
    pub sample_rate: u32,

    /// Channel count. Always 1 (mono).
    pub channels: u16,

    /// Sample encoding.
    pub encoding: SampleEncoding,
}

impl AudioFormat {
    /// Mono PCM16 little-endian at `sample_rate`.
    #[must_use]
    pub const fn pcm16_mono(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: 1,
            encoding: SampleEncoding::Pcm16Le,
        }
    }

    /// Bytes per second of audio in this format.
    #[must_use]
    pub const fn byte_rate(&self) -> u64 {
        self.sample_rate as u64 * self.channels as u64 * PCM16_BYTES_PER_SAMPLE as u64
    }
}

/// One utterance to synthesize.
///
/// `speed` is already normalized (1.0 = normal); mapping a platform speech
/// rate onto it is the caller's job (see
/// [`Settings::effective_speed`](crate::settings::Settings::effective_speed)).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    /// Text to speak.
    pub text: String,

    /// Engine-specific speaker index.
    pub speaker_id: i32,

    /// Speed multiplier.
    pub speed: f32,
}

impl SynthesisRequest {
    /// Build a request.
    pub fn new(text: impl Into<String>, speaker_id: i32, speed: f32) -> Self {
        Self {
            text: text.into(),
            speaker_id,
            speed,
        }
    }

    /// Whether there is nothing to speak.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcm16_mono_format() {
        let format = AudioFormat::pcm16_mono(16_000);
        assert_eq!(format.channels, 1);
        assert_eq!(format.encoding, SampleEncoding::Pcm16Le);
        assert_eq!(format.byte_rate(), 32_000);
    }

    #[test]
    fn whitespace_request_is_blank() {
        assert!(SynthesisRequest::new("  \n\t", 0, 1.0).is_blank());
        assert!(!SynthesisRequest::new(" A ", 0, 1.0).is_blank());
    }
}
