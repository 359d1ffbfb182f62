//! Float ↔ PCM16 little-endian conversion helpers.

use ttsbridge_core::PCM16_BYTES_PER_SAMPLE;

/// Scale factor between `[-1.0, 1.0]` floats and signed 16-bit samples.
const PCM16_SCALE: f32 = 32_767.0;

/// Convert one float sample to PCM16, saturating outside `[-1.0, 1.0]`.
///
/// The product is truncated toward zero, then clamped. NaN maps to silence.
#[allow(clippy::cast_possible_truncation)]
pub fn f32_to_i16(sample: f32) -> i16 {
    // `as` saturates on overflow and maps NaN to 0.
    let scaled = (sample * PCM16_SCALE) as i32;
    scaled.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Convert float samples into `out`, replacing its contents.
///
/// `out` is cleared but keeps its allocation, so one scratch buffer can be
/// reused for every chunk of an utterance.
pub fn encode_into(samples: &[f32], out: &mut Vec<u8>) {
    out.clear();
    out.reserve(samples.len() * PCM16_BYTES_PER_SAMPLE);
    for &sample in samples {
        out.extend_from_slice(&f32_to_i16(sample).to_le_bytes());
    }
}

/// Convert float samples into a freshly allocated PCM16 buffer.
pub fn encode(samples: &[f32]) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(samples, &mut out);
    out
}

/// Decode PCM16 little-endian bytes into samples. A trailing odd byte is ignored.
pub fn decode(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(PCM16_BYTES_PER_SAMPLE)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Force a byte count down to a whole number of samples.
pub const fn even_floor(bytes: usize) -> usize {
    bytes & !1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_scale_maps_to_extremes() {
        assert_eq!(f32_to_i16(1.0), 32_767);
        assert_eq!(f32_to_i16(-1.0), -32_767);
        assert_eq!(f32_to_i16(0.0), 0);
    }

    #[test]
    fn out_of_range_saturates_instead_of_wrapping() {
        assert_eq!(f32_to_i16(1.5), i16::MAX);
        assert_eq!(f32_to_i16(-2.0), i16::MIN);
        assert_eq!(f32_to_i16(f32::INFINITY), i16::MAX);
        assert_eq!(f32_to_i16(f32::NEG_INFINITY), i16::MIN);
        assert_eq!(f32_to_i16(f32::NAN), 0);
    }

    #[test]
    fn conversion_truncates_toward_zero() {
        // 0.5 * 32767 = 16383.5
        assert_eq!(f32_to_i16(0.5), 16_383);
        assert_eq!(f32_to_i16(-0.5), -16_383);
    }

    #[test]
    fn encode_is_little_endian() {
        let bytes = encode(&[1.0, -1.0]);
        assert_eq!(bytes, vec![0xFF, 0x7F, 0x01, 0x80]);
        assert_eq!(decode(&bytes), vec![32_767, -32_767]);
    }

    #[test]
    fn encode_into_reuses_the_buffer() {
        let mut scratch = Vec::with_capacity(64);
        encode_into(&[0.1; 8], &mut scratch);
        let capacity = scratch.capacity();
        encode_into(&[0.2; 4], &mut scratch);
        assert_eq!(scratch.len(), 8);
        assert_eq!(scratch.capacity(), capacity);
    }

    #[test]
    fn decode_ignores_trailing_odd_byte() {
        assert_eq!(decode(&[0x01, 0x00, 0x7F]), vec![1]);
    }

    #[test]
    fn even_floor_rounds_down() {
        assert_eq!(even_floor(0), 0);
        assert_eq!(even_floor(1), 0);
        assert_eq!(even_floor(4097), 4096);
        assert_eq!(even_floor(4096), 4096);
    }
}
