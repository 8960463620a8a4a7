//! Audio capture unit — microphone acquisition, conversion, waveform feed.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → AudioChunk (mpsc) → drain thread
//!           → mix_to_mono → resample(16 kHz) → CaptureSession buffer
//!                                            → WaveformFrame (~30 fps)
//! ```
//!
//! The orchestrator records through the [`CaptureUnit`] trait; production
//! code uses [`MicCapture`], tests use a scripted double.

pub mod capture;
pub mod resample;
pub mod session;
pub mod unit;
pub mod wav;
pub mod waveform;

pub use capture::{AudioChunk, CaptureError, Microphone, StreamHandle};
pub use resample::{mix_to_mono, resample};
pub use session::{CaptureSession, RecordedAudio, WaveformFeed};
pub use unit::{CaptureUnit, MicCapture};
pub use wav::{encode_wav_mono, WavError};
pub use waveform::WaveformFrame;

// test-only re-export so the interview test modules can import MockCapture
// without reaching into `unit` directly.
#[cfg(test)]
pub use unit::MockCapture;
