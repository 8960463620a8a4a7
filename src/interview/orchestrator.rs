//! Turn orchestrator — drives the question → playback → answer → transcribe
//! loop.
//!
//! [`InterviewOrchestrator`] owns every piece of session state (phase,
//! thread id, transcript, capture unit) and mutates it from exactly one
//! place: its event loop.  Long-running work — question generation,
//! synthesis + playback, transcription — runs in spawned subtasks that
//! report back over an internal channel, so an `End` command is accepted
//! from any state without waiting for the work to finish.  Completions that
//! arrive after teardown are dropped.
//!
//! # Flow
//!
//! ```text
//! Begin
//!   └─▶ create thread ─▶ next question (seed prompt)    [AiSpeaking]
//!         └─▶ open turn, speak(question)
//!               └─▶ playback done                        [AwaitingAnswer]
//! StartRecording  → open capture session                 [Recording]
//! StopRecording   → close session → WAV → transcribe     [Transcribing]
//!   ├─ Ok   → complete turn → next question(answer)      [AiSpeaking]
//!   └─ Err  → retryable error                            [AwaitingAnswer]
//! End (any state) → release audio, halt playback,
//!                   deliver transcript, fire Completed   [Ended]
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::audio::{CaptureUnit, WaveformFrame};
use crate::conversation::{ConversationClient, ConversationError};
use crate::delivery::{DeliveryPayload, TranscriptDelivery};
use crate::speech::SpeechPlayback;
use crate::transcribe::{TranscribeError, Transcriber};

use super::phase::Phase;
use super::transcript::Transcript;

// ---------------------------------------------------------------------------
// Commands and events
// ---------------------------------------------------------------------------

/// Commands sent from the front end to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewCommand {
    /// Create the conversation thread and ask the opening question.
    Begin,
    /// Start recording an answer (accepted only in `AwaitingAnswer`).
    StartRecording,
    /// Stop recording and transcribe (accepted only in `Recording`).
    StopRecording,
    /// End the session.  Accepted from any state; idempotent.
    End,
}

/// Progress events delivered from the orchestrator to the front end.
#[derive(Debug, Clone)]
pub enum InterviewEvent {
    /// The phase changed.
    PhaseChanged(Phase),
    /// A new question arrived; `number` counts from 1.
    QuestionReady { number: usize, text: String },
    /// The open turn was completed with the transcribed answer.
    AnswerRecorded { text: String, duration_secs: f32 },
    /// A live visualization frame (only while recording).
    Waveform(WaveformFrame),
    /// A retryable, user-visible error.
    Error { message: String },
    /// The session ended and delivery was attempted.  Fires exactly once.
    Completed { delivered: bool },
}

// ---------------------------------------------------------------------------
// Internal subtask outcomes
// ---------------------------------------------------------------------------

enum TaskOutcome {
    ThreadCreated(Result<String, ConversationError>),
    QuestionFetched(Result<String, ConversationError>),
    SpeechDone,
    Transcribed {
        result: Result<String, TranscribeError>,
        duration_secs: f32,
    },
}

// ---------------------------------------------------------------------------
// InterviewOrchestrator
// ---------------------------------------------------------------------------

/// The interview state machine.  Create with [`InterviewOrchestrator::new`],
/// then drive it with [`run`](Self::run) — typically raced against a front
/// end that feeds commands and consumes events.
pub struct InterviewOrchestrator {
    capture: Box<dyn CaptureUnit>,
    speech: Arc<SpeechPlayback>,
    transcriber: Arc<dyn Transcriber>,
    conversation: Arc<dyn ConversationClient>,
    delivery: Arc<dyn TranscriptDelivery>,
    contact: String,
    seed_prompt: String,

    phase: Phase,
    thread_id: Option<String>,
    transcript: Transcript,
    fetching_question: bool,
    questions_asked: usize,

    event_tx: mpsc::Sender<InterviewEvent>,
    task_tx: mpsc::Sender<TaskOutcome>,
    task_rx: Option<mpsc::Receiver<TaskOutcome>>,
    waveform_rx: Option<mpsc::Receiver<WaveformFrame>>,
}

impl InterviewOrchestrator {
    /// Create a new orchestrator.
    ///
    /// * `capture` — the audio capture unit (exclusively owned here).
    /// * `speech` — the playback unit.
    /// * `transcriber` / `conversation` / `delivery` — remote collaborators.
    /// * `contact` — normalized contact number for the delivery payload.
    /// * `seed_prompt` — literal prompt for the opening question.
    /// * `waveform_rx` — frames from the capture unit, forwarded as events
    ///   while recording.
    /// * `event_tx` — where progress events go.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        capture: Box<dyn CaptureUnit>,
        speech: Arc<SpeechPlayback>,
        transcriber: Arc<dyn Transcriber>,
        conversation: Arc<dyn ConversationClient>,
        delivery: Arc<dyn TranscriptDelivery>,
        contact: String,
        seed_prompt: String,
        waveform_rx: mpsc::Receiver<WaveformFrame>,
        event_tx: mpsc::Sender<InterviewEvent>,
    ) -> Self {
        let (task_tx, task_rx) = mpsc::channel(16);

        Self {
            capture,
            speech,
            transcriber,
            conversation,
            delivery,
            contact,
            seed_prompt,
            phase: Phase::Idle,
            thread_id: None,
            transcript: Transcript::new(),
            fetching_question: false,
            questions_asked: 0,
            event_tx,
            task_tx,
            task_rx: Some(task_rx),
            waveform_rx: Some(waveform_rx),
        }
    }

    /// Completed turns recorded so far.
    pub fn completed_turns(&self) -> usize {
        self.transcript.completed()
    }

    // -----------------------------------------------------------------------
    // Main event loop
    // -----------------------------------------------------------------------

    /// Run the orchestrator until the session ends.
    ///
    /// A closed command channel (front end gone) is treated as an `End` so
    /// teardown and delivery still happen.
    pub async fn run(mut self, mut cmd_rx: mpsc::Receiver<InterviewCommand>) {
        let Some(mut task_rx) = self.task_rx.take() else {
            return;
        };
        let Some(mut waveform_rx) = self.waveform_rx.take() else {
            return;
        };

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(InterviewCommand::Begin) => self.handle_begin().await,
                    Some(InterviewCommand::StartRecording) => self.handle_start_recording().await,
                    Some(InterviewCommand::StopRecording) => self.handle_stop_recording().await,
                    Some(InterviewCommand::End) | None => self.handle_end().await,
                },
                Some(outcome) = task_rx.recv() => self.apply(outcome).await,
                Some(frame) = waveform_rx.recv() => {
                    if self.phase == Phase::Recording {
                        let _ = self.event_tx.send(InterviewEvent::Waveform(frame)).await;
                    }
                }
            }

            if self.phase == Phase::Ended {
                break;
            }
        }

        log::info!("interview orchestrator shut down");
    }

    // -----------------------------------------------------------------------
    // Command handlers
    // -----------------------------------------------------------------------

    /// Begin: create the conversation thread, then ask the seed question.
    async fn handle_begin(&mut self) {
        if self.phase != Phase::Idle {
            log::debug!("begin ignored in phase {:?}", self.phase);
            return;
        }

        self.set_phase(Phase::AiSpeaking).await;

        let conversation = Arc::clone(&self.conversation);
        let task_tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = conversation.create_thread().await;
            let _ = task_tx.send(TaskOutcome::ThreadCreated(result)).await;
        });
    }

    /// Start recording.  Refused outside `AwaitingAnswer` — in particular
    /// while the AI is speaking.
    async fn handle_start_recording(&mut self) {
        if !self.phase.can_start_recording() {
            log::debug!("recording start ignored in phase {:?}", self.phase);
            return;
        }

        match self.capture.start() {
            Ok(()) => self.set_phase(Phase::Recording).await,
            Err(e) => {
                // No session was created; the phase stays actionable.
                self.send_error(e.to_string()).await;
            }
        }
    }

    /// Stop recording, encode the artifact, and transcribe it.
    async fn handle_stop_recording(&mut self) {
        if !self.phase.can_stop_recording() {
            log::debug!("recording stop ignored in phase {:?}", self.phase);
            return;
        }

        let Some(recorded) = self.capture.stop() else {
            log::warn!("capture session was already closed");
            self.set_phase(Phase::AwaitingAnswer).await;
            return;
        };

        let duration_secs = recorded.duration_secs();
        self.set_phase(Phase::Transcribing).await;

        let wav = match recorded.to_wav() {
            Ok(wav) => wav,
            Err(e) => {
                self.send_error(e.to_string()).await;
                self.set_phase(Phase::AwaitingAnswer).await;
                return;
            }
        };

        let transcriber = Arc::clone(&self.transcriber);
        let task_tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = transcriber.transcribe(wav).await;
            let _ = task_tx
                .send(TaskOutcome::Transcribed {
                    result,
                    duration_secs,
                })
                .await;
        });
    }

    /// End the session.  Idempotent; accepted from any state.
    async fn handle_end(&mut self) {
        if self.phase == Phase::Ended {
            log::debug!("end ignored: session already ended");
            return;
        }

        // Release every audio resource before anything else.
        if self.capture.stop().is_some() {
            log::debug!("open capture session force-closed at session end");
        }
        self.speech.halt();
        self.set_phase(Phase::Ended).await;

        let payload = DeliveryPayload {
            contact: self.contact.clone(),
            transcript: self.transcript.serialize(),
        };

        // Exactly one attempt; failure is logged, never surfaced, and the
        // completion event fires either way.
        let delivered = match self.delivery.deliver(&payload).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("transcript delivery failed (ignored): {e}");
                false
            }
        };

        let _ = self
            .event_tx
            .send(InterviewEvent::Completed { delivered })
            .await;
    }

    // -----------------------------------------------------------------------
    // Subtask completions
    // -----------------------------------------------------------------------

    async fn apply(&mut self, outcome: TaskOutcome) {
        // Completions against a torn-down session are no-ops.
        if !self.phase.is_live() {
            return;
        }

        match outcome {
            TaskOutcome::ThreadCreated(Ok(thread_id)) => {
                log::info!("conversation thread created: {thread_id}");
                self.thread_id = Some(thread_id);
                let seed = self.seed_prompt.clone();
                self.request_question(seed).await;
            }
            TaskOutcome::ThreadCreated(Err(e)) => {
                self.send_error(e.to_string()).await;
                // Back to Idle so Begin can be retried.
                self.set_phase(Phase::Idle).await;
            }

            TaskOutcome::QuestionFetched(Ok(question)) => {
                self.fetching_question = false;
                if let Err(e) = self.transcript.begin_turn(question.clone()) {
                    log::warn!("could not open a turn for the new question: {e}");
                }
                // Counted independently of the transcript so the displayed
                // number advances even when no new turn was opened.
                self.questions_asked += 1;
                let _ = self
                    .event_tx
                    .send(InterviewEvent::QuestionReady {
                        number: self.questions_asked,
                        text: question.clone(),
                    })
                    .await;

                let speech = Arc::clone(&self.speech);
                let task_tx = self.task_tx.clone();
                tokio::spawn(async move {
                    let outcome = speech.speak(&question).await;
                    log::debug!("speak finished: {outcome:?}");
                    let _ = task_tx.send(TaskOutcome::SpeechDone).await;
                });
            }
            TaskOutcome::QuestionFetched(Err(e)) => {
                self.fetching_question = false;
                self.send_error(e.to_string()).await;
                // The user can re-record (retrying generation) or end.
                self.set_phase(Phase::AwaitingAnswer).await;
            }

            TaskOutcome::SpeechDone => {
                // Playback completion (or absorbed failure) unlocks recording.
                if self.phase == Phase::AiSpeaking {
                    self.set_phase(Phase::AwaitingAnswer).await;
                }
            }

            TaskOutcome::Transcribed {
                result,
                duration_secs,
            } => {
                if self.phase != Phase::Transcribing {
                    log::debug!("stale transcription result dropped");
                    return;
                }
                match result {
                    Ok(text) => {
                        if self.transcript.has_open_turn() {
                            // Empty text is recorded as given.
                            let _ = self.transcript.complete_turn(text.clone(), duration_secs);
                            let _ = self
                                .event_tx
                                .send(InterviewEvent::AnswerRecorded {
                                    text: text.clone(),
                                    duration_secs,
                                })
                                .await;
                        } else {
                            // Recovery after a failed generation: the new
                            // transcription only seeds the next question.
                            log::info!("no open turn; using transcription as the next prompt");
                        }
                        self.request_question(text).await;
                    }
                    Err(e) => {
                        self.send_error(e.to_string()).await;
                        self.set_phase(Phase::AwaitingAnswer).await;
                    }
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Request the next question.  Guarded so only one request per thread is
    /// ever outstanding.
    async fn request_question(&mut self, utterance: String) {
        if self.fetching_question {
            log::warn!("question request ignored: one is already in flight");
            return;
        }
        let Some(thread_id) = self.thread_id.clone() else {
            self.send_error("no conversation thread exists".into()).await;
            return;
        };

        self.fetching_question = true;
        self.set_phase(Phase::AiSpeaking).await;

        let conversation = Arc::clone(&self.conversation);
        let task_tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = conversation.next_question(&thread_id, &utterance).await;
            let _ = task_tx.send(TaskOutcome::QuestionFetched(result)).await;
        });
    }

    async fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            log::debug!("phase {:?} → {:?}", self.phase, phase);
            self.phase = phase;
            let _ = self
                .event_tx
                .send(InterviewEvent::PhaseChanged(phase))
                .await;
        }
    }

    async fn send_error(&self, message: String) {
        log::error!("interview error: {message}");
        let _ = self.event_tx.send(InterviewEvent::Error { message }).await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
