//! The session transcript — ordered question/answer turns.
//!
//! A [`Turn`] opens when its question arrives and is completed exactly once
//! by the transcription handler.  At most one turn is open at any time, a
//! turn's question always exists before its answer, and turns are never
//! deleted within a session.

use thiserror::Error;

/// Separator between serialized turn segments.
const SEGMENT_SEPARATOR: &str = " / ";

/// Transcript text delivered when the session ends with nothing answered.
const EMPTY_TRANSCRIPT_NOTICE: &str = "녹음된 질문과 답변이 없습니다.";

// ---------------------------------------------------------------------------
// TranscriptError
// ---------------------------------------------------------------------------

/// Violations of the one-open-turn invariant.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("a turn is already open")]
    TurnAlreadyOpen,

    #[error("no turn is open")]
    NoOpenTurn,
}

// ---------------------------------------------------------------------------
// Turn
// ---------------------------------------------------------------------------

/// One question/answer exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    /// The generated question, set at creation.
    pub question: String,
    /// The transcribed answer — `None` while the turn is open.  An empty
    /// string is a valid completed answer.
    pub answer: Option<String>,
    /// Answer length in seconds; `0.0` until the turn completes.
    pub duration_secs: f32,
}

impl Turn {
    fn open(question: String) -> Self {
        Self {
            question,
            answer: None,
            duration_secs: 0.0,
        }
    }

    /// Whether the answer has been recorded yet.
    pub fn is_complete(&self) -> bool {
        self.answer.is_some()
    }
}

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// The ordered turn log for one session.
#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new turn for `question`.
    ///
    /// # Errors
    ///
    /// [`TranscriptError::TurnAlreadyOpen`] when the previous turn has not
    /// been completed.
    pub fn begin_turn(&mut self, question: String) -> Result<(), TranscriptError> {
        if self.has_open_turn() {
            return Err(TranscriptError::TurnAlreadyOpen);
        }
        self.turns.push(Turn::open(question));
        Ok(())
    }

    /// Complete the open turn with the transcribed answer and its duration.
    ///
    /// # Errors
    ///
    /// [`TranscriptError::NoOpenTurn`] when nothing is open.
    pub fn complete_turn(
        &mut self,
        answer: String,
        duration_secs: f32,
    ) -> Result<(), TranscriptError> {
        match self.turns.last_mut() {
            Some(turn) if !turn.is_complete() => {
                turn.answer = Some(answer);
                turn.duration_secs = duration_secs;
                Ok(())
            }
            _ => Err(TranscriptError::NoOpenTurn),
        }
    }

    /// Whether a turn is waiting for its answer.
    pub fn has_open_turn(&self) -> bool {
        self.turns.last().is_some_and(|t| !t.is_complete())
    }

    /// Number of turns, open or complete.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of completed turns.
    pub fn completed(&self) -> usize {
        self.turns.iter().filter(|t| t.is_complete()).count()
    }

    /// All turns in insertion order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Serialize the completed turns for delivery.
    ///
    /// Each completed turn renders one `질문 : Q, 답변 : A` segment, in
    /// insertion order, joined by a fixed separator with none trailing.
    /// With no completed turns a fixed notice string is returned so the
    /// delivery payload is never empty.
    pub fn serialize(&self) -> String {
        let segments: Vec<String> = self
            .turns
            .iter()
            .filter_map(|turn| {
                turn.answer
                    .as_ref()
                    .map(|answer| format!("질문 : {}, 답변 : {}", turn.question, answer))
            })
            .collect();

        if segments.is_empty() {
            EMPTY_TRANSCRIPT_NOTICE.to_string()
        } else {
            segments.join(SEGMENT_SEPARATOR)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- invariants --------------------------------------------------------

    #[test]
    fn question_exists_before_answer() {
        let mut t = Transcript::new();
        // Completing with no open turn must fail.
        assert_eq!(
            t.complete_turn("답변".into(), 1.0),
            Err(TranscriptError::NoOpenTurn)
        );

        t.begin_turn("질문".into()).unwrap();
        assert!(t.complete_turn("답변".into(), 1.0).is_ok());
    }

    #[test]
    fn at_most_one_open_turn() {
        let mut t = Transcript::new();
        t.begin_turn("첫 질문".into()).unwrap();
        assert_eq!(
            t.begin_turn("둘째 질문".into()),
            Err(TranscriptError::TurnAlreadyOpen)
        );
    }

    #[test]
    fn turn_completes_exactly_once() {
        let mut t = Transcript::new();
        t.begin_turn("질문".into()).unwrap();
        t.complete_turn("답변".into(), 2.5).unwrap();
        assert_eq!(
            t.complete_turn("다시".into(), 1.0),
            Err(TranscriptError::NoOpenTurn)
        );

        assert_eq!(t.turns()[0].answer.as_deref(), Some("답변"));
        assert!((t.turns()[0].duration_secs - 2.5).abs() < 1e-6);
    }

    #[test]
    fn empty_answer_is_a_valid_completion() {
        let mut t = Transcript::new();
        t.begin_turn("질문".into()).unwrap();
        t.complete_turn(String::new(), 0.8).unwrap();

        assert!(!t.has_open_turn());
        assert_eq!(t.completed(), 1);
        assert_eq!(t.turns()[0].answer.as_deref(), Some(""));
    }

    // ---- serialization -----------------------------------------------------

    #[test]
    fn serializes_one_segment_per_completed_turn_in_order() {
        let mut t = Transcript::new();
        t.begin_turn("자기소개를 해주세요".into()).unwrap();
        t.complete_turn("홍길동입니다".into(), 3.0).unwrap();
        t.begin_turn("지원 동기는 무엇인가요".into()).unwrap();
        t.complete_turn("성장하고 싶습니다".into(), 4.0).unwrap();

        assert_eq!(
            t.serialize(),
            "질문 : 자기소개를 해주세요, 답변 : 홍길동입니다 / \
             질문 : 지원 동기는 무엇인가요, 답변 : 성장하고 싶습니다"
        );
    }

    #[test]
    fn no_trailing_separator() {
        let mut t = Transcript::new();
        t.begin_turn("Q".into()).unwrap();
        t.complete_turn("A".into(), 1.0).unwrap();

        let s = t.serialize();
        assert_eq!(s, "질문 : Q, 답변 : A");
        assert!(!s.ends_with(SEGMENT_SEPARATOR));
    }

    #[test]
    fn open_turn_is_not_serialized() {
        let mut t = Transcript::new();
        t.begin_turn("Q1".into()).unwrap();
        t.complete_turn("A1".into(), 1.0).unwrap();
        t.begin_turn("Q2".into()).unwrap(); // never answered

        assert_eq!(t.serialize(), "질문 : Q1, 답변 : A1");
    }

    #[test]
    fn empty_transcript_renders_the_notice() {
        let t = Transcript::new();
        assert_eq!(t.serialize(), EMPTY_TRANSCRIPT_NOTICE);
    }

    #[test]
    fn only_open_turns_render_the_notice_too() {
        let mut t = Transcript::new();
        t.begin_turn("Q".into()).unwrap();
        assert_eq!(t.serialize(), EMPTY_TRANSCRIPT_NOTICE);
    }

    #[test]
    fn empty_answer_serializes_as_given() {
        let mut t = Transcript::new();
        t.begin_turn("Q".into()).unwrap();
        t.complete_turn(String::new(), 0.5).unwrap();
        assert_eq!(t.serialize(), "질문 : Q, 답변 : ");
    }

    // ---- counters ----------------------------------------------------------

    #[test]
    fn counts_track_open_and_completed() {
        let mut t = Transcript::new();
        assert!(t.is_empty());

        t.begin_turn("Q1".into()).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.completed(), 0);
        assert!(t.has_open_turn());

        t.complete_turn("A1".into(), 1.0).unwrap();
        assert_eq!(t.completed(), 1);
        assert!(!t.has_open_turn());
    }
}
