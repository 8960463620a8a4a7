//! The interview itself — phase machine, transcript, self-test, and the
//! orchestrator that ties the remote collaborators together.
//!
//! The front end talks to this module through two channels: it sends
//! [`InterviewCommand`]s in and receives [`InterviewEvent`]s out.  Every
//! piece of session state lives inside [`InterviewOrchestrator`] and is only
//! ever touched from its event loop.

pub mod orchestrator;
pub mod phase;
pub mod self_test;
pub mod transcript;

pub use orchestrator::{InterviewCommand, InterviewEvent, InterviewOrchestrator};
pub use phase::Phase;
pub use self_test::{run_self_test, SelfTestError, SelfTestReport};
pub use transcript::{Transcript, TranscriptError, Turn};
