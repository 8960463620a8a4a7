//! Microphone self-test — run before the interview starts.
//!
//! Records a short fixed window, transcribes it, and requires that the
//! service heard *something*: a transcription that trims to an empty string
//! counts as a failure so the user fixes their input device before the
//! session, not during it.  Whatever happens, the capture session is closed
//! before this returns.

use std::time::Duration;

use thiserror::Error;

use crate::audio::{CaptureError, CaptureUnit, WavError};
use crate::transcribe::{TranscribeError, Transcriber};

// ---------------------------------------------------------------------------
// SelfTestError
// ---------------------------------------------------------------------------

/// Reasons the self-test did not pass.
#[derive(Debug, Error)]
pub enum SelfTestError {
    /// The microphone could not be opened or recorded from.
    #[error("microphone check failed: {0}")]
    Capture(#[from] CaptureError),

    /// The recording could not be encoded for upload.
    #[error("audio encoding failed: {0}")]
    Encode(#[from] WavError),

    /// The transcription request failed.
    #[error("transcription check failed: {0}")]
    Transcription(#[from] TranscribeError),

    /// Transcription succeeded but heard nothing.
    #[error("no speech was recognized; check the microphone and try again")]
    NoSpeech,
}

// ---------------------------------------------------------------------------
// Self-test
// ---------------------------------------------------------------------------

/// What the self-test heard.
#[derive(Debug)]
pub struct SelfTestReport {
    /// The recognized text.
    pub text: String,
    /// Length of the recorded window in seconds.
    pub duration_secs: f32,
}

/// Record for `window`, transcribe, and require non-empty recognized text.
pub async fn run_self_test(
    capture: &mut dyn CaptureUnit,
    transcriber: &dyn Transcriber,
    window: Duration,
) -> Result<SelfTestReport, SelfTestError> {
    capture.start()?;
    tokio::time::sleep(window).await;

    // Session closed here, before any request goes out.
    let Some(recorded) = capture.stop() else {
        return Err(SelfTestError::Capture(CaptureError::Stream(
            "capture session closed unexpectedly".into(),
        )));
    };

    let duration_secs = recorded.duration_secs();
    let wav = recorded.to_wav()?;
    let text = transcriber.transcribe(wav).await?;

    if text.trim().is_empty() {
        return Err(SelfTestError::NoSpeech);
    }

    Ok(SelfTestReport {
        text,
        duration_secs,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MockCapture;
    use crate::transcribe::MockTranscriber;

    #[tokio::test]
    async fn passes_when_speech_is_recognized() {
        let mut capture = MockCapture::with_audio(vec![0.2; 8_000]);
        let transcriber = MockTranscriber::ok("마이크 테스트입니다");

        let report = run_self_test(&mut capture, &transcriber, Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(report.text, "마이크 테스트입니다");
        assert_eq!(capture.starts, 1);
        assert_eq!(capture.closed, 1);
    }

    #[tokio::test]
    async fn empty_transcription_fails_as_no_speech() {
        let mut capture = MockCapture::with_audio(vec![0.0; 8_000]);
        let transcriber = MockTranscriber::ok("   ");

        let err = run_self_test(&mut capture, &transcriber, Duration::ZERO)
            .await
            .unwrap_err();

        assert!(matches!(err, SelfTestError::NoSpeech));
        // Session still released.
        assert_eq!(capture.closed, 1);
    }

    #[tokio::test]
    async fn permission_failure_surfaces_as_capture_error() {
        let mut capture = MockCapture::permission_denied();
        let transcriber = MockTranscriber::ok("text");

        let err = run_self_test(&mut capture, &transcriber, Duration::ZERO)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SelfTestError::Capture(CaptureError::PermissionDenied(_))
        ));
        assert!(!capture.is_recording());
    }

    #[tokio::test]
    async fn transcription_failure_still_releases_the_session() {
        let mut capture = MockCapture::with_audio(vec![0.2; 8_000]);
        let transcriber = MockTranscriber::failing();

        let err = run_self_test(&mut capture, &transcriber, Duration::ZERO)
            .await
            .unwrap_err();

        assert!(matches!(err, SelfTestError::Transcription(_)));
        assert_eq!(capture.closed, 1);
    }
}
