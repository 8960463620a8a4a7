//! Speech playback unit — synthesize a question and play it back.
//!
//! # Contract
//!
//! [`SpeechPlayback::speak`] holds the caller for the whole
//! synthesize-then-play cycle and **always returns** — synthesis failures,
//! decode failures, and playback-start failures all collapse into an
//! immediate done signal so the interview can advance to the answer phase
//! instead of stalling.  Any previously playing audio is stopped before a
//! new clip starts.

pub mod player;
pub mod synthesis;

pub use player::{AudioSink, PlaybackError, RodioSink};
pub use synthesis::{HttpSynthesizer, SynthesisError, Synthesizer};

use std::sync::Arc;

// ---------------------------------------------------------------------------
// SpeakOutcome
// ---------------------------------------------------------------------------

/// How a `speak` call ended.  Every variant means "done" to the caller; the
/// distinction exists for logging and tests only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakOutcome {
    /// The clip played to completion (or was stopped mid-play).
    Played,
    /// The synthesis request failed; nothing was played.
    SynthesisFailed,
    /// Synthesis succeeded but the clip could not be played.
    PlaybackFailed,
}

// ---------------------------------------------------------------------------
// SpeechPlayback
// ---------------------------------------------------------------------------

/// The playback unit: a synthesizer plus an output sink.
pub struct SpeechPlayback {
    synth: Arc<dyn Synthesizer>,
    sink: Arc<dyn AudioSink>,
}

impl SpeechPlayback {
    pub fn new(synth: Arc<dyn Synthesizer>, sink: Arc<dyn AudioSink>) -> Self {
        Self { synth, sink }
    }

    /// Synthesize `text` and play it, returning when playback is done.
    ///
    /// Never fails from the caller's point of view: on any error the method
    /// logs and returns the corresponding outcome so the orchestrator can
    /// advance to the answer phase.
    pub async fn speak(&self, text: &str) -> SpeakOutcome {
        // Tear down whatever was playing before acquiring new audio.
        self.sink.stop();

        let audio = match self.synth.synthesize(text).await {
            Ok(audio) => audio,
            Err(e) => {
                log::warn!("speech synthesis failed ({e}); continuing without audio");
                return SpeakOutcome::SynthesisFailed;
            }
        };

        // The sink blocks until the clip ends, so hand it to the blocking
        // pool rather than stalling the orchestrator's event loop.
        let sink = Arc::clone(&self.sink);
        match tokio::task::spawn_blocking(move || sink.play(audio)).await {
            Ok(Ok(())) => SpeakOutcome::Played,
            Ok(Err(e)) => {
                log::warn!("audio playback failed ({e}); continuing without audio");
                SpeakOutcome::PlaybackFailed
            }
            Err(e) => {
                log::warn!("playback task failed ({e})");
                SpeakOutcome::PlaybackFailed
            }
        }
    }

    /// Stop any in-flight playback immediately.
    pub fn halt(&self) {
        self.sink.stop();
    }
}

// ---------------------------------------------------------------------------
// SilentSink
// ---------------------------------------------------------------------------

/// A sink that plays nothing and completes instantly.
///
/// Used when no output device exists so the wizard degrades to text-only
/// questions instead of refusing to run.
pub struct SilentSink;

impl AudioSink for SilentSink {
    fn play(&self, _audio: Vec<u8>) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn stop(&self) {}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
