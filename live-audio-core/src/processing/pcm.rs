//! 16-bit PCM sample conversion.
//!
//! Capture and playback deliberately use different scalings: capture maps
//! negative samples by 32768 and non-negative ones by 32767 so both ends of
//! `[-1.0, 1.0]` land exactly on the i16 limits, while playback divides every
//! sample by 32768.0 regardless of sign.

use crate::models::error::LiveAudioError;

/// Convert one float sample to 16-bit PCM, clamping out-of-range input first.
pub fn f32_to_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Convert one 16-bit PCM sample to float.
pub fn i16_to_f32(sample: i16) -> f32 {
    sample as f32 / 32768.0
}

pub fn convert_block(samples: &[f32]) -> Vec<i16> {
    samples.iter().map(|&s| f32_to_i16(s)).collect()
}

/// Serialize samples as little-endian bytes. Output length = `samples.len() * 2`.
pub fn encode_i16_le(samples: &[i16]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        data.extend_from_slice(&sample.to_le_bytes());
    }
    data
}

/// Reinterpret little-endian bytes as 16-bit samples.
pub fn decode_i16_le(bytes: &[u8]) -> Result<Vec<i16>, LiveAudioError> {
    if bytes.len() % 2 != 0 {
        return Err(LiveAudioError::MalformedAudioChunk(format!(
            "odd byte length {}",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Downmix interleaved multi-channel audio to mono by averaging channels per frame.
pub fn downmix_to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn capture_scaling_hits_both_limits() {
        assert_eq!(f32_to_i16(-1.0), i16::MIN);
        assert_eq!(f32_to_i16(0.0), 0);
        assert_eq!(f32_to_i16(1.0), i16::MAX);
    }

    #[test]
    fn capture_scaling_is_asymmetric() {
        assert_eq!(f32_to_i16(-0.5), -16384);
        assert_eq!(f32_to_i16(0.5), 16383);
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        assert_eq!(f32_to_i16(2.0), i16::MAX);
        assert_eq!(f32_to_i16(-3.0), i16::MIN);
        assert_eq!(f32_to_i16(f32::INFINITY), i16::MAX);
    }

    #[test]
    fn every_sample_stays_in_range() {
        for i in -1000..=1000 {
            let s = i as f32 / 1000.0;
            let v = f32_to_i16(s) as i32;
            assert!((-32768..=32767).contains(&v), "{} -> {}", s, v);
        }
    }

    #[test]
    fn playback_divides_by_32768() {
        assert_abs_diff_eq!(i16_to_f32(i16::MIN), -1.0);
        assert_abs_diff_eq!(i16_to_f32(0), 0.0);
        assert_abs_diff_eq!(i16_to_f32(i16::MAX), 32767.0 / 32768.0);
        assert_abs_diff_eq!(i16_to_f32(16384), 0.5);
    }

    #[test]
    fn float_round_trip_is_within_one() {
        for v in (i16::MIN..=i16::MAX).step_by(97).chain([i16::MIN, -1, 0, 1, i16::MAX]) {
            let back = f32_to_i16(i16_to_f32(v)) as i32;
            assert!((back - v as i32).abs() <= 1, "{} came back as {}", v, back);
        }
    }

    #[test]
    fn little_endian_layout() {
        let bytes = encode_i16_le(&[1, -2, 0x1234]);
        assert_eq!(bytes, vec![0x01, 0x00, 0xFE, 0xFF, 0x34, 0x12]);
        assert_eq!(decode_i16_le(&bytes).unwrap(), vec![1, -2, 0x1234]);
    }

    #[test]
    fn odd_length_is_malformed() {
        let err = decode_i16_le(&[0, 1, 2]).unwrap_err();
        assert!(matches!(err, LiveAudioError::MalformedAudioChunk(_)));
    }

    #[test]
    fn downmix_averages_frames() {
        let mono = downmix_to_mono(&[0.2, 0.4, -1.0, 1.0], 2);
        assert_eq!(mono.len(), 2);
        assert_abs_diff_eq!(mono[0], 0.3, epsilon = 1e-6);
        assert_abs_diff_eq!(mono[1], 0.0, epsilon = 1e-6);
        assert_eq!(downmix_to_mono(&[0.1, 0.2], 1), vec![0.1, 0.2]);
    }
}
