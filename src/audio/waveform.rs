//! Live waveform frames for the recording visualization.
//!
//! While a capture session is open, the drain thread emits a
//! [`WaveformFrame`] roughly every 33 ms computed from the most recent slice
//! of audio.  The feed is purely observational — it never affects recording
//! state — and stops with the session.

// ---------------------------------------------------------------------------
// WaveformFrame
// ---------------------------------------------------------------------------

/// One visualization sample: per-bar amplitudes plus an overall level.
#[derive(Debug, Clone)]
pub struct WaveformFrame {
    /// RMS amplitude per bar, clamped to `[0.0, 1.0]`, oldest bar first.
    pub bars: Vec<f32>,
    /// RMS level of the whole window, clamped to `[0.0, 1.0]`.
    pub level: f32,
}

impl WaveformFrame {
    /// Compute a frame with `num_bars` bars from the given audio window.
    ///
    /// The window is split into `num_bars` equal chunks; each bar is the RMS
    /// of its chunk.  A window shorter than `num_bars` pads the leading bars
    /// with silence so the newest audio always sits at the right edge.
    pub fn from_window(window: &[f32], num_bars: usize) -> Self {
        if num_bars == 0 {
            return Self {
                bars: Vec::new(),
                level: 0.0,
            };
        }
        if window.is_empty() {
            return Self::silence(num_bars);
        }

        let chunk_size = (window.len() / num_bars).max(1);
        let mut bars: Vec<f32> = window
            .chunks(chunk_size)
            .take(num_bars)
            .map(rms)
            .collect();

        if bars.len() < num_bars {
            let mut padded = vec![0.0; num_bars - bars.len()];
            padded.append(&mut bars);
            bars = padded;
        }

        Self {
            level: rms(window),
            bars,
        }
    }

    /// A frame of all-zero bars.
    pub fn silence(num_bars: usize) -> Self {
        Self {
            bars: vec![0.0; num_bars],
            level: 0.0,
        }
    }

    /// Peak bar value (useful for normalising a bar display).
    pub fn peak(&self) -> f32 {
        self.bars.iter().cloned().fold(0.0_f32, f32::max)
    }
}

fn rms(chunk: &[f32]) -> f32 {
    if chunk.is_empty() {
        return 0.0;
    }
    let mean_sq: f32 = chunk.iter().map(|s| s * s).sum::<f32>() / chunk.len() as f32;
    mean_sq.sqrt().min(1.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_requested_number_of_bars() {
        let frame = WaveformFrame::from_window(&vec![0.3_f32; 16_000], 24);
        assert_eq!(frame.bars.len(), 24);
    }

    #[test]
    fn bars_stay_in_unit_range() {
        let frame = WaveformFrame::from_window(&vec![1.5_f32; 1_600], 10);
        for &b in &frame.bars {
            assert!((0.0..=1.0).contains(&b), "bar out of range: {b}");
        }
        assert!((0.0..=1.0).contains(&frame.level));
    }

    #[test]
    fn silent_window_is_all_zero() {
        let frame = WaveformFrame::from_window(&vec![0.0_f32; 1_600], 10);
        assert!(frame.bars.iter().all(|&b| b == 0.0));
        assert_eq!(frame.level, 0.0);
    }

    #[test]
    fn empty_window_yields_silence_frame() {
        let frame = WaveformFrame::from_window(&[], 10);
        assert_eq!(frame.bars, WaveformFrame::silence(10).bars);
    }

    #[test]
    fn zero_bars_yields_empty_frame() {
        let frame = WaveformFrame::from_window(&vec![0.5_f32; 100], 0);
        assert!(frame.bars.is_empty());
    }

    #[test]
    fn short_window_pads_leading_bars() {
        // One sample cannot fill 8 bars; silence pads the front, newest audio
        // lands in the last bar.
        let frame = WaveformFrame::from_window(&[0.5_f32], 8);
        assert_eq!(frame.bars.len(), 8);
        assert!(frame.bars[..7].iter().all(|&b| b == 0.0));
        assert!((frame.bars[7] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn level_matches_constant_signal() {
        let frame = WaveformFrame::from_window(&vec![0.5_f32; 1_600], 10);
        assert!((frame.level - 0.5).abs() < 1e-4);
    }

    #[test]
    fn peak_reflects_loudest_bar() {
        let mut window = vec![0.0_f32; 800];
        window.extend(vec![0.8_f32; 800]);
        let frame = WaveformFrame::from_window(&window, 2);
        assert!((frame.peak() - 0.8).abs() < 1e-4);
    }
}
