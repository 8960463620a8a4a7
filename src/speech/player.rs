//! Audio playback via `rodio`.
//!
//! rodio's `OutputStream` is not `Send`, so [`RodioSink`] confines it to a
//! dedicated playback thread and talks to it over a channel — the same
//! dedicated-audio-thread arrangement the capture side uses.  A shared handle
//! to the active `rodio::Sink` lets [`AudioSink::stop`] interrupt playback
//! from any thread: stopping the sink makes the worker's `sleep_until_end`
//! return promptly.

use std::io::Cursor;
use std::sync::{mpsc, Arc, Mutex};

use thiserror::Error;

// ---------------------------------------------------------------------------
// PlaybackError
// ---------------------------------------------------------------------------

/// Errors raised while playing synthesized audio.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No audio output device could be opened.
    #[error("no audio output device: {0}")]
    NoOutputDevice(String),

    /// The audio bytes could not be decoded (not valid MP3).
    #[error("failed to decode audio: {0}")]
    Decode(String),

    /// The output stream rejected the sink.
    #[error("audio output failed: {0}")]
    Output(String),

    /// The playback thread is gone.
    #[error("playback worker is no longer running")]
    WorkerGone,
}

// ---------------------------------------------------------------------------
// AudioSink trait
// ---------------------------------------------------------------------------

/// Blocking playback seam.
///
/// `play` blocks the calling thread until the audio finishes or `stop` is
/// called from elsewhere; the orchestrator always calls it through
/// `tokio::task::spawn_blocking`.
pub trait AudioSink: Send + Sync {
    /// Play `audio` (encoded MP3) to completion.
    fn play(&self, audio: Vec<u8>) -> Result<(), PlaybackError>;

    /// Stop whatever is currently playing.  No-op when idle.
    fn stop(&self);
}

// ---------------------------------------------------------------------------
// RodioSink
// ---------------------------------------------------------------------------

struct PlayRequest {
    audio: Vec<u8>,
    done_tx: mpsc::Sender<Result<(), PlaybackError>>,
}

/// rodio-backed [`AudioSink`] with a dedicated playback thread.
pub struct RodioSink {
    cmd_tx: Mutex<mpsc::Sender<PlayRequest>>,
    current: Arc<Mutex<Option<Arc<rodio::Sink>>>>,
}

impl RodioSink {
    /// Spawn the playback thread and open the default output device.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::NoOutputDevice`] when the device cannot be opened —
    /// the wizard degrades to text-only questions in that case.
    pub fn spawn() -> Result<Self, PlaybackError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<PlayRequest>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), PlaybackError>>();

        let current: Arc<Mutex<Option<Arc<rodio::Sink>>>> = Arc::new(Mutex::new(None));
        let worker_current = Arc::clone(&current);

        std::thread::Builder::new()
            .name("speech-playback".into())
            .spawn(move || {
                // The OutputStream must live on this thread for as long as
                // anything plays through it.
                let (_stream, handle) = match rodio::OutputStream::try_default() {
                    Ok(pair) => {
                        let _ = ready_tx.send(Ok(()));
                        pair
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(PlaybackError::NoOutputDevice(e.to_string())));
                        return;
                    }
                };

                while let Ok(request) = cmd_rx.recv() {
                    let result = play_one(&handle, &worker_current, request.audio);
                    let _ = request.done_tx.send(result);
                }

                log::debug!("speech-playback thread exiting");
            })
            .map_err(|e| PlaybackError::Output(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                cmd_tx: Mutex::new(cmd_tx),
                current,
            }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(PlaybackError::WorkerGone),
        }
    }
}

/// Decode and play one clip on the worker thread, publishing the active sink
/// so `stop` can interrupt it.
fn play_one(
    handle: &rodio::OutputStreamHandle,
    current: &Mutex<Option<Arc<rodio::Sink>>>,
    audio: Vec<u8>,
) -> Result<(), PlaybackError> {
    let source = rodio::Decoder::new(Cursor::new(audio))
        .map_err(|e| PlaybackError::Decode(e.to_string()))?;

    let sink = rodio::Sink::try_new(handle).map_err(|e| PlaybackError::Output(e.to_string()))?;
    let sink = Arc::new(sink);

    {
        let mut slot = lock_current(current);
        // A prior clip still in the slot means stop() raced us; silence it.
        if let Some(prev) = slot.take() {
            prev.stop();
        }
        *slot = Some(Arc::clone(&sink));
    }

    sink.append(source);
    sink.sleep_until_end();

    lock_current(current).take();
    Ok(())
}

fn lock_current<'a>(
    current: &'a Mutex<Option<Arc<rodio::Sink>>>,
) -> std::sync::MutexGuard<'a, Option<Arc<rodio::Sink>>> {
    match current.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl AudioSink for RodioSink {
    fn play(&self, audio: Vec<u8>) -> Result<(), PlaybackError> {
        let (done_tx, done_rx) = mpsc::channel();

        {
            let tx = match self.cmd_tx.lock() {
                Ok(tx) => tx,
                Err(poisoned) => poisoned.into_inner(),
            };
            tx.send(PlayRequest { audio, done_tx })
                .map_err(|_| PlaybackError::WorkerGone)?;
        }

        done_rx.recv().map_err(|_| PlaybackError::WorkerGone)?
    }

    fn stop(&self) {
        if let Some(sink) = lock_current(&self.current).take() {
            sink.stop();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
