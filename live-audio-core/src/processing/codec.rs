//! Base64 transport encoding for PCM frames and chunks.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::models::error::LiveAudioError;
use crate::processing::pcm;

/// Base64 of the samples' little-endian bytes.
pub fn encode_frame(samples: &[i16]) -> String {
    STANDARD.encode(pcm::encode_i16_le(samples))
}

/// Decode a base64 chunk of 16-bit mono PCM into float samples.
pub fn decode_chunk(chunk: &str) -> Result<Vec<f32>, LiveAudioError> {
    let bytes = STANDARD
        .decode(chunk.trim())
        .map_err(|e| LiveAudioError::MalformedAudioChunk(format!("invalid base64: {}", e)))?;
    let samples = pcm::decode_i16_le(&bytes)?;
    Ok(samples.into_iter().map(pcm::i16_to_f32).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn encodes_raw_little_endian_bytes() {
        // [0x0001, 0xFFFF] -> bytes 01 00 FF FF
        assert_eq!(encode_frame(&[1, -1]), "AQD//w==");
        assert_eq!(encode_frame(&[]), "");
    }

    #[test]
    fn decodes_to_normalized_floats() {
        let chunk = encode_frame(&[i16::MIN, 0, 16384]);
        let samples = decode_chunk(&chunk).unwrap();
        assert_eq!(samples.len(), 3);
        assert_abs_diff_eq!(samples[0], -1.0);
        assert_abs_diff_eq!(samples[1], 0.0);
        assert_abs_diff_eq!(samples[2], 0.5);
    }

    #[test]
    fn odd_byte_length_is_rejected() {
        let chunk = STANDARD.encode([1u8, 2, 3]);
        assert!(matches!(
            decode_chunk(&chunk),
            Err(LiveAudioError::MalformedAudioChunk(_))
        ));
    }

    #[test]
    fn invalid_base64_is_rejected() {
        assert!(matches!(
            decode_chunk("not*base64"),
            Err(LiveAudioError::MalformedAudioChunk(_))
        ));
    }

    #[test]
    fn empty_chunk_decodes_to_no_samples() {
        assert!(decode_chunk("").unwrap().is_empty());
    }
}
