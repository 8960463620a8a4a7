//! In-memory WAV encoding of the recorded answer.
//!
//! The transcription endpoint takes a multipart file upload, so the captured
//! 16 kHz mono `f32` samples are encoded as a 16-bit PCM WAV blob with
//! `hound` before the request is built.  Nothing ever touches disk.

use std::io::Cursor;

use thiserror::Error;

/// Errors raised while encoding the WAV artifact.
#[derive(Debug, Error)]
pub enum WavError {
    #[error("WAV encoding failed: {0}")]
    Encode(#[from] hound::Error),
}

/// Encode mono `f32` samples in `[-1.0, 1.0]` as a 16-bit PCM WAV blob.
///
/// Samples outside the unit range are clamped before quantisation.
pub fn encode_wav_mono(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, WavError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &s in samples {
            let clamped = s.clamp(-1.0, 1.0);
            writer.write_sample((clamped * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_riff_header() {
        let bytes = encode_wav_mono(&vec![0.0_f32; 160], 16_000).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
    }

    #[test]
    fn empty_input_is_a_valid_header_only_file() {
        let bytes = encode_wav_mono(&[], 16_000).unwrap();
        // 44-byte canonical header, no data
        assert_eq!(bytes.len(), 44);
    }

    #[test]
    fn one_second_has_expected_data_size() {
        let bytes = encode_wav_mono(&vec![0.25_f32; 16_000], 16_000).unwrap();
        // header + 16 000 samples × 2 bytes
        assert_eq!(bytes.len(), 44 + 32_000);
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        // Must not overflow the i16 conversion
        let bytes = encode_wav_mono(&[2.0_f32, -2.0], 16_000).unwrap();
        assert_eq!(bytes.len(), 44 + 4);
    }
}
