//! The capture unit — the orchestrator-facing recording contract.
//!
//! [`CaptureUnit`] is the seam the Turn Orchestrator records through, so the
//! interview loop can be tested without audio hardware.  [`MicCapture`] is
//! the production implementation backed by cpal.
//!
//! # Guarantees
//!
//! * At most one capture session is ever open; a second `start` while one is
//!   open is an ignored no-op.
//! * `stop` is idempotent — with nothing open it returns `None` and raises
//!   no error.
//! * A failed `start` holds no resources; the caller's phase must not
//!   advance into recording.

use tokio::sync::mpsc;

use super::capture::{CaptureError, Microphone};
use super::session::{CaptureSession, RecordedAudio, WaveformFeed};
use super::waveform::WaveformFrame;

// ---------------------------------------------------------------------------
// CaptureUnit
// ---------------------------------------------------------------------------

/// Recording contract used by the orchestrator and the microphone self-test.
pub trait CaptureUnit {
    /// Request the microphone and begin recording.
    ///
    /// A no-op when a session is already open.
    ///
    /// # Errors
    ///
    /// [`CaptureError::PermissionDenied`] when access is refused,
    /// [`CaptureError::DeviceUnavailable`] when no capture device exists.
    /// On error no session was created.
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Whether a capture session is currently open.
    fn is_recording(&self) -> bool;

    /// Stop recording and return the captured audio.
    ///
    /// Idempotent: returns `None` when no session is open.
    fn stop(&mut self) -> Option<RecordedAudio>;

    /// Seconds the open session has been recording, or `0.0` when idle.
    fn elapsed_secs(&self) -> f32;
}

// ---------------------------------------------------------------------------
// MicCapture
// ---------------------------------------------------------------------------

/// cpal-backed [`CaptureUnit`].
///
/// The device is acquired fresh on every `start` so a microphone plugged in
/// after launch is picked up, and a device failure surfaces at the moment
/// the user acts rather than at construction.
pub struct MicCapture {
    target_rate: u32,
    feed: WaveformFeed,
    session: Option<CaptureSession>,
}

impl MicCapture {
    /// Create a capture unit recording at `target_rate` Hz mono, emitting
    /// waveform frames with `bars` bars to `waveform_tx`.
    pub fn new(target_rate: u32, bars: usize, waveform_tx: mpsc::Sender<WaveformFrame>) -> Self {
        Self {
            target_rate,
            feed: WaveformFeed {
                tx: waveform_tx,
                bars,
            },
            session: None,
        }
    }
}

impl CaptureUnit for MicCapture {
    fn start(&mut self) -> Result<(), CaptureError> {
        if self.session.is_some() {
            log::warn!("capture start ignored: a session is already open");
            return Ok(());
        }

        let mic = Microphone::open_default()?;
        log::info!(
            "microphone acquired ({} Hz, {} ch)",
            mic.sample_rate(),
            mic.channels()
        );

        let session = CaptureSession::open(&mic, self.target_rate, self.feed.clone())?;
        self.session = Some(session);
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    fn stop(&mut self) -> Option<RecordedAudio> {
        self.session.take().map(CaptureSession::close)
    }

    fn elapsed_secs(&self) -> f32 {
        self.session
            .as_ref()
            .map(CaptureSession::elapsed_secs)
            .unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// MockCapture (test double)
// ---------------------------------------------------------------------------

/// Scripted [`CaptureUnit`] for orchestrator and self-test tests.
#[cfg(test)]
pub struct MockCapture {
    behaviour: MockBehaviour,
    open: bool,
    /// Number of successful starts.
    pub starts: u32,
    /// Number of stops that actually closed a session.
    pub closed: u32,
    /// Duration reported for every recording.
    pub duration_secs: f32,
}

#[cfg(test)]
enum MockBehaviour {
    /// Start succeeds; stop yields these samples.
    Audio(Vec<f32>),
    /// Start fails with `PermissionDenied`.
    PermissionDenied,
    /// Start fails with `DeviceUnavailable`.
    DeviceUnavailable,
}

#[cfg(test)]
impl MockCapture {
    pub fn with_audio(samples: Vec<f32>) -> Self {
        Self {
            behaviour: MockBehaviour::Audio(samples),
            open: false,
            starts: 0,
            closed: 0,
            duration_secs: 1.0,
        }
    }

    pub fn permission_denied() -> Self {
        Self {
            behaviour: MockBehaviour::PermissionDenied,
            open: false,
            starts: 0,
            closed: 0,
            duration_secs: 0.0,
        }
    }

    pub fn device_unavailable() -> Self {
        Self {
            behaviour: MockBehaviour::DeviceUnavailable,
            open: false,
            starts: 0,
            closed: 0,
            duration_secs: 0.0,
        }
    }
}

#[cfg(test)]
impl CaptureUnit for MockCapture {
    fn start(&mut self) -> Result<(), CaptureError> {
        if self.open {
            return Ok(());
        }
        match &self.behaviour {
            MockBehaviour::Audio(_) => {
                self.open = true;
                self.starts += 1;
                Ok(())
            }
            MockBehaviour::PermissionDenied => {
                Err(CaptureError::PermissionDenied("mock".into()))
            }
            MockBehaviour::DeviceUnavailable => Err(CaptureError::DeviceUnavailable),
        }
    }

    fn is_recording(&self) -> bool {
        self.open
    }

    fn stop(&mut self) -> Option<RecordedAudio> {
        if !self.open {
            return None;
        }
        self.open = false;
        self.closed += 1;
        match &self.behaviour {
            MockBehaviour::Audio(samples) => Some(RecordedAudio {
                samples: samples.clone(),
                sample_rate: 16_000,
            }),
            _ => None,
        }
    }

    fn elapsed_secs(&self) -> f32 {
        if self.open {
            self.duration_secs
        } else {
            0.0
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> MockCapture {
        MockCapture::with_audio(vec![0.1; 16_000])
    }

    /// Any start/stop sequence leaves 0 or 1 open sessions, never more.
    #[test]
    fn repeated_starts_keep_one_session() {
        let mut cap = unit();
        cap.start().unwrap();
        cap.start().unwrap();
        cap.start().unwrap();

        assert!(cap.is_recording());
        assert_eq!(cap.starts, 1);

        assert!(cap.stop().is_some());
        assert!(!cap.is_recording());
        assert_eq!(cap.closed, 1);
    }

    /// Stop with nothing open is a silent no-op.
    #[test]
    fn stop_when_idle_is_noop() {
        let mut cap = unit();
        assert!(cap.stop().is_none());
        assert!(cap.stop().is_none());
        assert_eq!(cap.closed, 0);
    }

    /// Every successful start is matched by exactly one closing stop.
    #[test]
    fn start_stop_pairs_balance() {
        let mut cap = unit();
        for _ in 0..5 {
            cap.start().unwrap();
            assert!(cap.stop().is_some());
        }
        assert_eq!(cap.starts, 5);
        assert_eq!(cap.closed, 5);
        assert!(!cap.is_recording());
    }

    /// A failed start opens nothing.
    #[test]
    fn failed_start_leaves_no_session() {
        let mut cap = MockCapture::permission_denied();
        assert!(matches!(
            cap.start(),
            Err(CaptureError::PermissionDenied(_))
        ));
        assert!(!cap.is_recording());
        assert!(cap.stop().is_none());
    }

    #[test]
    fn elapsed_is_zero_when_idle() {
        let cap = unit();
        assert_eq!(cap.elapsed_secs(), 0.0);
    }
}
