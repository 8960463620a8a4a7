//! The interview state machine's single tagged state value.
//!
//! The phase drives which commands the orchestrator accepts and which
//! resources may be acquired:
//!
//! ```text
//! Idle ──begin──▶ AiSpeaking ──playback done──▶ AwaitingAnswer
//!                     ▲                              │ start recording
//!                     │                              ▼
//!                 next question ◀── Transcribing ◀── Recording
//!                                        │ failure
//!                                        ▼
//!                                  AwaitingAnswer (retry)
//! any phase ──end──▶ Ended (terminal)
//! ```
//!
//! One enum value replaces the independent boolean flags such a flow tends
//! to accumulate: `Recording` while `AiSpeaking` is unrepresentable.

/// Current state of the interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Before the session begins; nothing is held.
    #[default]
    Idle,

    /// A question is being generated, synthesized, or played.  Recording
    /// start is refused here.
    AiSpeaking,

    /// Playback finished (or speech failed); the user may record an answer.
    AwaitingAnswer,

    /// A capture session is open; only stop or end are accepted.
    Recording,

    /// Recording stopped, transcription in flight; recording cannot restart
    /// until it resolves.
    Transcribing,

    /// The session has ended.  Terminal.
    Ended,
}

impl Phase {
    /// Whether a recording may start now.
    pub fn can_start_recording(&self) -> bool {
        matches!(self, Phase::AwaitingAnswer)
    }

    /// Whether a recording may stop now.
    pub fn can_stop_recording(&self) -> bool {
        matches!(self, Phase::Recording)
    }

    /// Whether the session is still live.  Completions arriving after the
    /// end are dropped based on this.
    pub fn is_live(&self) -> bool {
        !matches!(self, Phase::Ended)
    }

    /// A short human-readable label for the status line.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "Idle",
            Phase::AiSpeaking => "AI speaking",
            Phase::AwaitingAnswer => "Your turn",
            Phase::Recording => "Recording",
            Phase::Transcribing => "Transcribing",
            Phase::Ended => "Ended",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_phase_is_idle() {
        assert_eq!(Phase::default(), Phase::Idle);
    }

    #[test]
    fn only_awaiting_answer_can_start_recording() {
        assert!(Phase::AwaitingAnswer.can_start_recording());

        assert!(!Phase::Idle.can_start_recording());
        assert!(!Phase::AiSpeaking.can_start_recording());
        assert!(!Phase::Recording.can_start_recording());
        assert!(!Phase::Transcribing.can_start_recording());
        assert!(!Phase::Ended.can_start_recording());
    }

    #[test]
    fn only_recording_can_stop_recording() {
        assert!(Phase::Recording.can_stop_recording());

        assert!(!Phase::Idle.can_stop_recording());
        assert!(!Phase::AiSpeaking.can_stop_recording());
        assert!(!Phase::AwaitingAnswer.can_stop_recording());
        assert!(!Phase::Transcribing.can_stop_recording());
        assert!(!Phase::Ended.can_stop_recording());
    }

    /// A single tagged value cannot be `Recording` and `AiSpeaking` at once.
    #[test]
    fn recording_excludes_ai_speaking() {
        let phase = Phase::Recording;
        assert!(phase.can_stop_recording());
        assert_ne!(phase, Phase::AiSpeaking);
    }

    #[test]
    fn only_ended_is_not_live() {
        assert!(!Phase::Ended.is_live());

        assert!(Phase::Idle.is_live());
        assert!(Phase::AiSpeaking.is_live());
        assert!(Phase::AwaitingAnswer.is_live());
        assert!(Phase::Recording.is_live());
        assert!(Phase::Transcribing.is_live());
    }

    #[test]
    fn labels_are_distinct() {
        let labels = [
            Phase::Idle.label(),
            Phase::AiSpeaking.label(),
            Phase::AwaitingAnswer.label(),
            Phase::Recording.label(),
            Phase::Transcribing.label(),
            Phase::Ended.label(),
        ];
        for (i, a) in labels.iter().enumerate() {
            for b in &labels[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
