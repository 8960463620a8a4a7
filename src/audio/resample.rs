//! Channel downmix and sample-rate conversion.
//!
//! The transcription artifact is **16 kHz mono `f32`** audio regardless of
//! what the device delivers, so every captured chunk passes through:
//!
//! 1. [`mix_to_mono`] — average interleaved channels down to one.
//! 2. [`resample`] — linear-interpolation rate conversion.
//!
//! Linear interpolation is entirely adequate for speech headed to a remote
//! recognizer; the upload is lossy-compressed server-side anyway.

/// Mix interleaved multi-channel audio down to mono by averaging each frame.
///
/// The output length is `samples.len() / channels`.  Mono input is returned
/// as an owned copy; `channels == 0` yields an empty vector.
pub fn mix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

/// Resample `samples` from `from_hz` to `to_hz` by linear interpolation.
///
/// Equal rates and empty input are no-op fast paths.  The output length is
/// approximately `samples.len() * to_hz / from_hz`.
pub fn resample(samples: &[f32], from_hz: u32, to_hz: u32) -> Vec<f32> {
    if from_hz == to_hz {
        return samples.to_vec();
    }
    if samples.is_empty() || from_hz == 0 || to_hz == 0 {
        return Vec::new();
    }

    let ratio = to_hz as f64 / from_hz as f64;
    let output_len = (samples.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 / ratio;
        let idx = src_pos as usize;
        let frac = (src_pos - idx as f64) as f32;

        let sample = if idx + 1 < samples.len() {
            samples[idx] * (1.0 - frac) + samples[idx + 1] * frac
        } else if idx < samples.len() {
            samples[idx]
        } else {
            0.0
        };

        output.push(sample);
    }

    output
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- mix_to_mono -------------------------------------------------------

    #[test]
    fn mono_input_is_copied_unchanged() {
        let input = vec![0.1_f32, 0.2, 0.3];
        assert_eq!(mix_to_mono(&input, 1), input);
    }

    #[test]
    fn stereo_frames_are_averaged() {
        let input = vec![1.0_f32, -1.0, 0.5, 0.5];
        let out = mix_to_mono(&input, 2);
        assert_eq!(out.len(), 2);
        assert!((out[0]).abs() < 1e-6);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn zero_channels_yields_empty() {
        assert!(mix_to_mono(&[1.0_f32, 2.0], 0).is_empty());
    }

    // ---- resample ----------------------------------------------------------

    #[test]
    fn equal_rates_is_noop() {
        let input: Vec<f32> = (0..160).map(|i| i as f32 / 160.0).collect();
        let out = resample(&input, 16_000, 16_000);
        assert_eq!(out, input);
    }

    #[test]
    fn empty_input_yields_empty() {
        assert!(resample(&[], 48_000, 16_000).is_empty());
    }

    #[test]
    fn downsample_48k_to_16k_length() {
        // 480 samples @ 48 kHz = 10 ms → 160 samples @ 16 kHz
        let out = resample(&vec![0.5_f32; 480], 48_000, 16_000);
        assert_eq!(out.len(), 160);
    }

    #[test]
    fn downsample_44100_to_16k_length() {
        let out = resample(&vec![0.0_f32; 44_100], 44_100, 16_000);
        assert!(out.len().abs_diff(16_000) <= 1, "got {}", out.len());
    }

    #[test]
    fn dc_signal_amplitude_preserved() {
        let out = resample(&vec![0.5_f32; 480], 48_000, 16_000);
        for &s in &out {
            assert!((s - 0.5).abs() < 1e-5, "amplitude drift: {s}");
        }
    }

    #[test]
    fn upsample_doubles_length() {
        let out = resample(&vec![0.0_f32; 80], 8_000, 16_000);
        assert_eq!(out.len(), 160);
    }
}
