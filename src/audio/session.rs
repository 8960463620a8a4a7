//! The live capture session — one open microphone recording.
//!
//! A [`CaptureSession`] bundles every resource the recording owns: the cpal
//! stream handle, the drain thread that converts chunks to 16 kHz mono, the
//! accumulation buffer, the start timestamp, and the waveform feed.  Opening
//! acquires everything; [`CaptureSession::close`] (or dropping the value)
//! releases everything.  There is no path that leaves a stream open.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::mpsc as tokio_mpsc;

use super::capture::{CaptureError, Microphone, StreamHandle};
use super::resample::{mix_to_mono, resample};
use super::wav::{encode_wav_mono, WavError};
use super::waveform::WaveformFrame;

/// Interval between waveform frames (~30 fps).
const WAVEFORM_FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Seconds of trailing audio each waveform frame is computed from.
const WAVEFORM_WINDOW_SECS: f32 = 0.5;

// ---------------------------------------------------------------------------
// RecordedAudio
// ---------------------------------------------------------------------------

/// The artifact produced by a closed capture session: mono samples at the
/// target rate, ready to be WAV-encoded for upload.
#[derive(Debug, Clone)]
pub struct RecordedAudio {
    /// Mono `f32` samples at `sample_rate` Hz.
    pub samples: Vec<f32>,
    /// Sample rate of `samples` in Hz.
    pub sample_rate: u32,
}

impl RecordedAudio {
    /// Length of the recording in seconds.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Encode as a 16-bit PCM WAV blob for the multipart upload.
    pub fn to_wav(&self) -> Result<Vec<u8>, WavError> {
        encode_wav_mono(&self.samples, self.sample_rate)
    }
}

// ---------------------------------------------------------------------------
// WaveformFeed
// ---------------------------------------------------------------------------

/// Where a session sends its visualization frames.
#[derive(Clone)]
pub struct WaveformFeed {
    /// Frames are `try_send`-ed here; a full or closed channel drops the
    /// frame rather than stalling the drain thread.
    pub tx: tokio_mpsc::Sender<WaveformFrame>,
    /// Bars per frame.
    pub bars: usize,
}

// ---------------------------------------------------------------------------
// CaptureSession
// ---------------------------------------------------------------------------

/// One open microphone recording.
///
/// The cpal callback forwards raw chunks over an mpsc channel to a drain
/// thread, which downmixes, resamples to the target rate, accumulates the
/// result, and emits waveform frames at ~30 fps.  Dropping the session stops
/// the hardware stream, which closes the channel and ends the drain thread.
pub struct CaptureSession {
    stream: StreamHandle,
    buffer: Arc<Mutex<Vec<f32>>>,
    alive: Arc<AtomicBool>,
    target_rate: u32,
    started: Instant,
}

impl CaptureSession {
    /// Open a session on `mic`, recording at `target_rate` Hz mono.
    ///
    /// # Errors
    ///
    /// Propagates [`CaptureError`] from stream construction; on error no
    /// session exists and no resources are held.
    pub fn open(
        mic: &Microphone,
        target_rate: u32,
        feed: WaveformFeed,
    ) -> Result<Self, CaptureError> {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let alive = Arc::new(AtomicBool::new(true));

        let (chunk_tx, chunk_rx) = mpsc::channel();
        let stream = mic.stream_chunks(chunk_tx)?;

        let drain_buffer = Arc::clone(&buffer);
        let drain_alive = Arc::clone(&alive);
        let window_len = (target_rate as f32 * WAVEFORM_WINDOW_SECS) as usize;

        std::thread::Builder::new()
            .name("capture-drain".into())
            .spawn(move || {
                let mut last_frame = Instant::now();

                while let Ok(chunk) = chunk_rx.recv() {
                    if !drain_alive.load(Ordering::SeqCst) {
                        break;
                    }

                    let mono = mix_to_mono(&chunk.samples, chunk.channels);
                    let converted = resample(&mono, chunk.sample_rate, target_rate);

                    let mut buf = match drain_buffer.lock() {
                        Ok(buf) => buf,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                    buf.extend_from_slice(&converted);

                    if last_frame.elapsed() >= WAVEFORM_FRAME_INTERVAL {
                        let tail_start = buf.len().saturating_sub(window_len);
                        let frame = WaveformFrame::from_window(&buf[tail_start..], feed.bars);
                        drop(buf);
                        let _ = feed.tx.try_send(frame);
                        last_frame = Instant::now();
                    }
                }

                log::debug!("capture-drain thread exiting");
            })
            .map_err(|e| CaptureError::Stream(e.to_string()))?;

        Ok(Self {
            stream,
            buffer,
            alive,
            target_rate,
            started: Instant::now(),
        })
    }

    /// Seconds since the session opened.
    pub fn elapsed_secs(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }

    /// Close the session and flush everything recorded so far.
    ///
    /// Stops the waveform feed, releases the hardware stream, and returns
    /// the accumulated audio.  All resources are gone when this returns.
    pub fn close(self) -> RecordedAudio {
        // Stop the drain thread from accumulating or emitting frames first,
        // then tear down the stream; the dropped callback closes the chunk
        // channel and the thread exits.
        self.alive.store(false, Ordering::SeqCst);
        drop(self.stream);

        let samples = {
            let mut buf = match self.buffer.lock() {
                Ok(buf) => buf,
                Err(poisoned) => poisoned.into_inner(),
            };
            std::mem::take(&mut *buf)
        };

        log::debug!(
            "capture session closed: {} samples @ {} Hz",
            samples.len(),
            self.target_rate
        );

        RecordedAudio {
            samples,
            sample_rate: self.target_rate,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
