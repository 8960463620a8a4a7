//! Microphone access via `cpal`.
//!
//! [`Microphone`] wraps the cpal host/device/stream lifecycle.  Call
//! [`Microphone::stream_chunks`] to begin streaming [`AudioChunk`]s over an
//! mpsc channel.  The returned [`StreamHandle`] is a RAII guard — dropping it
//! stops the underlying cpal stream and releases the device.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::mpsc;
use thiserror::Error;

// ---------------------------------------------------------------------------
// AudioChunk
// ---------------------------------------------------------------------------

/// A single buffer of raw audio as delivered by the cpal callback.
///
/// Samples are interleaved `f32` in the range `[-1.0, 1.0]` at the device's
/// native rate and channel count; [`crate::audio::mix_to_mono`] and
/// [`crate::audio::resample`] convert them to the 16 kHz mono format the
/// transcription artifact uses.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Interleaved PCM samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Sample rate of this chunk in Hz.
    pub sample_rate: u32,
    /// Number of interleaved channels (1 = mono, 2 = stereo, …).
    pub channels: u16,
}

// ---------------------------------------------------------------------------
// StreamHandle
// ---------------------------------------------------------------------------

/// RAII guard that keeps the cpal input stream alive.
///
/// Dropping this value stops the underlying hardware stream; together with
/// the callback closure it also drops the chunk sender, which lets the
/// drain thread exit.
pub struct StreamHandle {
    _stream: cpal::Stream,
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors raised while acquiring or starting the microphone.
///
/// `PermissionDenied` and `DeviceUnavailable` are the two failures the
/// wizard distinguishes for the user; everything else is a stream-level
/// fault reported verbatim.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no audio input device is available")]
    DeviceUnavailable,

    #[error("microphone access was denied: {0}")]
    PermissionDenied(String),

    #[error("audio stream failed: {0}")]
    Stream(String),
}

impl From<cpal::BuildStreamError> for CaptureError {
    fn from(e: cpal::BuildStreamError) -> Self {
        match e {
            cpal::BuildStreamError::DeviceNotAvailable => CaptureError::DeviceUnavailable,
            // Backend-specific failures at build time are how the OS-level
            // permission prompt rejection surfaces through cpal.
            cpal::BuildStreamError::BackendSpecific { err } => {
                CaptureError::PermissionDenied(err.to_string())
            }
            other => CaptureError::Stream(other.to_string()),
        }
    }
}

impl From<cpal::PlayStreamError> for CaptureError {
    fn from(e: cpal::PlayStreamError) -> Self {
        match e {
            cpal::PlayStreamError::DeviceNotAvailable => CaptureError::DeviceUnavailable,
            other => CaptureError::Stream(other.to_string()),
        }
    }
}

impl From<cpal::DefaultStreamConfigError> for CaptureError {
    fn from(e: cpal::DefaultStreamConfigError) -> Self {
        match e {
            cpal::DefaultStreamConfigError::DeviceNotAvailable => CaptureError::DeviceUnavailable,
            other => CaptureError::Stream(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Microphone
// ---------------------------------------------------------------------------

/// The system default microphone, queried with its preferred configuration.
pub struct Microphone {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_rate: u32,
    channels: u16,
}

impl Microphone {
    /// Acquire the system default input device.
    ///
    /// # Errors
    ///
    /// [`CaptureError::DeviceUnavailable`] when no input device exists (no
    /// capture API present), or a config-query failure mapped through
    /// [`CaptureError`].
    pub fn open_default() -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::DeviceUnavailable)?;

        let supported = device.default_input_config()?;
        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;
        let config: cpal::StreamConfig = supported.into();

        Ok(Self {
            device,
            config,
            sample_rate,
            channels,
        })
    }

    /// Start streaming and send [`AudioChunk`]s to `tx`.
    ///
    /// The cpal callback runs on a dedicated audio thread; each hardware
    /// buffer is wrapped in an [`AudioChunk`] and forwarded over the channel.
    /// Send errors (receiver dropped) are silently ignored so the audio
    /// thread never panics.
    pub fn stream_chunks(
        &self,
        tx: mpsc::Sender<AudioChunk>,
    ) -> Result<StreamHandle, CaptureError> {
        let sample_rate = self.sample_rate;
        let channels = self.channels;

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let chunk = AudioChunk {
                    samples: data.to_vec(),
                    sample_rate,
                    channels,
                };
                let _ = tx.send(chunk);
            },
            |err: cpal::StreamError| {
                log::error!("cpal stream error: {err}");
            },
            None,
        )?;

        stream.play()?;
        Ok(StreamHandle { _stream: stream })
    }

    /// Native sample rate of the device in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of interleaved channels in each [`AudioChunk`].
    pub fn channels(&self) -> u16 {
        self.channels
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// `AudioChunk` must be `Send` so it can cross thread boundaries.
    #[test]
    fn audio_chunk_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<AudioChunk>();
    }

    #[test]
    fn build_stream_device_not_available_maps_to_device_unavailable() {
        let err: CaptureError = cpal::BuildStreamError::DeviceNotAvailable.into();
        assert!(matches!(err, CaptureError::DeviceUnavailable));
    }

    #[test]
    fn error_messages_are_user_readable() {
        assert_eq!(
            CaptureError::DeviceUnavailable.to_string(),
            "no audio input device is available"
        );
        assert!(CaptureError::PermissionDenied("denied".into())
            .to_string()
            .contains("denied"));
    }
}
