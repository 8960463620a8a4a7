//! Voice interview wizard — guided phone intake, microphone self-test, and a
//! multi-turn spoken interview driven by remote speech services.
//!
//! # Architecture
//!
//! ```text
//! stdin commands (mpsc)
//!        │
//!        ▼
//! InterviewOrchestrator::run()  ← async event loop, owns all session state
//!        │
//!        ├─ Begin          → create thread → next question → speak
//!        ├─ StartRecording → open CaptureSession (cpal) + waveform feed
//!        ├─ StopRecording  → close session → WAV → transcribe → next question
//!        └─ End            → release audio, halt playback, deliver transcript
//!
//! Remote collaborators (reqwest):
//!   POST /speech-synthesis   — text → base64 MP3     (speech::HttpSynthesizer)
//!   POST /transcription      — WAV multipart → text  (transcribe::HttpTranscriber)
//!   POST /conversation       — thread / next question (conversation::HttpConversationClient)
//!   webhook                  — final transcript       (delivery::WebhookDelivery)
//! ```

pub mod audio;
pub mod config;
pub mod contact;
pub mod conversation;
pub mod delivery;
pub mod interview;
pub mod speech;
pub mod transcribe;
