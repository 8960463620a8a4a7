//! Conversation client — `POST /conversation`.
//!
//! The proxy fronts a remote conversational-thread service: one action
//! creates a thread, the other sends the user's utterance and returns the
//! next generated question together with the remote run's status.
//!
//! # Bounded wait
//!
//! A question is not always ready when the response arrives: while the
//! remote run is still working the reported `runStatus` is non-terminal.
//! [`HttpConversationClient`] re-polls at a fixed interval with an explicit
//! ceiling (default 1 s × 60) and maps both ceiling exhaustion and terminal
//! failure statuses (`failed`, `cancelled`, `expired`) to
//! [`ConversationError::QuestionGenerationFailed`].  The whole wait is a
//! plain future, so dropping it cancels the polling.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// ConversationError
// ---------------------------------------------------------------------------

/// Errors raised by the conversational-thread collaborator.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("failed to create conversation thread: {0}")]
    ThreadCreationFailed(String),

    #[error("failed to generate the next question: {0}")]
    QuestionGenerationFailed(String),
}

// ---------------------------------------------------------------------------
// ConversationClient trait
// ---------------------------------------------------------------------------

/// Async seam for the conversational-thread service.
#[async_trait]
pub trait ConversationClient: Send + Sync {
    /// Obtain a new opaque thread identifier.
    async fn create_thread(&self) -> Result<String, ConversationError>;

    /// Send `utterance` on `thread_id` and return the next question text.
    ///
    /// The first call carries the literal seed prompt; later calls carry the
    /// user's transcribed answers.
    async fn next_question(
        &self,
        thread_id: &str,
        utterance: &str,
    ) -> Result<String, ConversationError>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CreateThreadRequest {
    action: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageRequest<'a> {
    action: &'static str,
    thread_id: &'a str,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateThreadResponse {
    thread_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageResponse {
    #[serde(default)]
    message: Option<String>,
    run_status: String,
}

/// Run statuses after which no question will ever arrive.
const FAILED_RUN_STATUSES: &[&str] = &["failed", "cancelled", "expired"];

/// Re-invoke `fetch` until the run reaches a terminal status, sleeping
/// `interval` between attempts, up to `ceiling` attempts in total.
///
/// Dropping the returned future cancels the wait.
async fn poll_until_complete<F, Fut>(
    mut fetch: F,
    interval: Duration,
    ceiling: u32,
) -> Result<String, ConversationError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<SendMessageResponse, ConversationError>>,
{
    for attempt in 1..=ceiling {
        let body = fetch().await?;

        if body.run_status == "completed" {
            return body.message.ok_or_else(|| {
                ConversationError::QuestionGenerationFailed(
                    "run completed without a message".into(),
                )
            });
        }

        if FAILED_RUN_STATUSES.contains(&body.run_status.as_str()) {
            return Err(ConversationError::QuestionGenerationFailed(format!(
                "run ended as {}",
                body.run_status
            )));
        }

        log::debug!(
            "conversation run still {} (poll {attempt}/{ceiling})",
            body.run_status
        );

        if attempt < ceiling {
            tokio::time::sleep(interval).await;
        }
    }

    Err(ConversationError::QuestionGenerationFailed(format!(
        "run did not complete within {ceiling} polls"
    )))
}

// ---------------------------------------------------------------------------
// HttpConversationClient
// ---------------------------------------------------------------------------

/// Calls the `/conversation` proxy endpoint.
pub struct HttpConversationClient {
    client: reqwest::Client,
    url: String,
    poll_interval: Duration,
    poll_ceiling: u32,
}

impl HttpConversationClient {
    /// Build a client against `base_url`.
    ///
    /// `poll_interval` / `poll_ceiling` bound the wait for a remote run to
    /// reach a terminal status (default: 1 s × 60).
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        poll_interval: Duration,
        poll_ceiling: u32,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            url: format!("{base_url}/conversation"),
            poll_interval,
            poll_ceiling: poll_ceiling.max(1),
        }
    }

    /// One sendMessage POST; returns the parsed response.
    async fn send_message(
        &self,
        thread_id: &str,
        message: &str,
    ) -> Result<SendMessageResponse, ConversationError> {
        let response = self
            .client
            .post(&self.url)
            .json(&SendMessageRequest {
                action: "sendMessage",
                thread_id,
                message,
            })
            .send()
            .await
            .map_err(|e| ConversationError::QuestionGenerationFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConversationError::QuestionGenerationFailed(format!(
                "HTTP {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ConversationError::QuestionGenerationFailed(e.to_string()))
    }
}

#[async_trait]
impl ConversationClient for HttpConversationClient {
    async fn create_thread(&self) -> Result<String, ConversationError> {
        let response = self
            .client
            .post(&self.url)
            .json(&CreateThreadRequest {
                action: "createThread",
            })
            .send()
            .await
            .map_err(|e| ConversationError::ThreadCreationFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConversationError::ThreadCreationFailed(format!(
                "HTTP {status}"
            )));
        }

        let body: CreateThreadResponse = response
            .json()
            .await
            .map_err(|e| ConversationError::ThreadCreationFailed(e.to_string()))?;

        Ok(body.thread_id)
    }

    async fn next_question(
        &self,
        thread_id: &str,
        utterance: &str,
    ) -> Result<String, ConversationError> {
        poll_until_complete(
            || self.send_message(thread_id, utterance),
            self.poll_interval,
            self.poll_ceiling,
        )
        .await
    }
}

// ---------------------------------------------------------------------------
// MockConversation (test double)
// ---------------------------------------------------------------------------

/// Scripted [`ConversationClient`] recording every prompt it receives.
#[cfg(test)]
pub struct MockConversation {
    thread: Result<String, String>,
    questions: std::sync::Mutex<std::collections::VecDeque<Result<String, String>>>,
    /// Every utterance passed to `next_question`, in order.
    pub prompts: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockConversation {
    pub fn new(thread_id: &str) -> Self {
        Self {
            thread: Ok(thread_id.to_string()),
            questions: std::sync::Mutex::new(std::collections::VecDeque::new()),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn failing_thread(message: &str) -> Self {
        Self {
            thread: Err(message.to_string()),
            questions: std::sync::Mutex::new(std::collections::VecDeque::new()),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn push_question(self, question: &str) -> Self {
        self.questions
            .lock()
            .unwrap()
            .push_back(Ok(question.to_string()));
        self
    }

    pub fn push_failure(self, message: &str) -> Self {
        self.questions
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }
}

#[cfg(test)]
#[async_trait]
impl ConversationClient for MockConversation {
    async fn create_thread(&self) -> Result<String, ConversationError> {
        self.thread
            .clone()
            .map_err(ConversationError::ThreadCreationFailed)
    }

    async fn next_question(
        &self,
        _thread_id: &str,
        utterance: &str,
    ) -> Result<String, ConversationError> {
        self.prompts.lock().unwrap().push(utterance.to_string());
        match self.questions.lock().unwrap().pop_front() {
            Some(Ok(q)) => Ok(q),
            Some(Err(m)) => Err(ConversationError::QuestionGenerationFailed(m)),
            None => Err(ConversationError::QuestionGenerationFailed(
                "no scripted question".into(),
            )),
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
    fn builds_endpoint_url() {
        let c = HttpConversationClient::new(
            "http://localhost:3000/api",
            30,
            Duration::from_secs(1),
            60,
        );
        assert_eq!(c.url, "http://localhost:3000/api/conversation");
        assert_eq!(c.poll_ceiling, 60);
    }

    #[test]
    fn poll_ceiling_is_at_least_one() {
        let c = HttpConversationClient::new("http://x", 30, Duration::from_secs(1), 0);
        assert_eq!(c.poll_ceiling, 1);
    }

    #[test]
    fn create_thread_request_wire_format() {
        let body = serde_json::to_value(CreateThreadRequest {
            action: "createThread",
        })
        .unwrap();
        assert_eq!(body["action"], "createThread");
    }

    #[test]
    fn send_message_request_wire_format() {
        let body = serde_json::to_value(SendMessageRequest {
            action: "sendMessage",
            thread_id: "thread_abc",
            message: "안녕하세요",
        })
        .unwrap();
        assert_eq!(body["action"], "sendMessage");
        assert_eq!(body["threadId"], "thread_abc");
        assert_eq!(body["message"], "안녕하세요");
    }

    #[test]
    fn send_message_response_parses_camel_case() {
        let json = r#"{ "message": "다음 질문입니다", "runStatus": "completed" }"#;
        let resp: SendMessageResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.message.as_deref(), Some("다음 질문입니다"));
        assert_eq!(resp.run_status, "completed");
    }

    #[test]
    fn pending_response_may_omit_message() {
        let json = r#"{ "runStatus": "in_progress" }"#;
        let resp: SendMessageResponse = serde_json::from_str(json).unwrap();
        assert!(resp.message.is_none());
    }

    #[test]
    fn terminal_failure_statuses() {
        for status in ["failed", "cancelled", "expired"] {
            assert!(FAILED_RUN_STATUSES.contains(&status));
        }
        assert!(!FAILED_RUN_STATUSES.contains(&"completed"));
        assert!(!FAILED_RUN_STATUSES.contains(&"in_progress"));
    }

    // ---- bounded poll ------------------------------------------------------

    /// Build a `fetch` closure that replays the scripted responses in order.
    fn scripted(
        responses: Vec<SendMessageResponse>,
    ) -> impl FnMut() -> std::future::Ready<Result<SendMessageResponse, ConversationError>> {
        let mut queue = std::collections::VecDeque::from(responses);
        move || {
            let next = queue.pop_front().unwrap_or(SendMessageResponse {
                message: None,
                run_status: "in_progress".into(),
            });
            std::future::ready(Ok(next))
        }
    }

    fn pending() -> SendMessageResponse {
        SendMessageResponse {
            message: None,
            run_status: "in_progress".into(),
        }
    }

    fn done(message: &str) -> SendMessageResponse {
        SendMessageResponse {
            message: Some(message.to_string()),
            run_status: "completed".into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn poll_returns_the_message_once_completed() {
        let fetch = scripted(vec![pending(), pending(), done("다음 질문")]);
        let result = poll_until_complete(fetch, Duration::from_secs(1), 60).await;
        assert_eq!(result.unwrap(), "다음 질문");
    }

    #[tokio::test(start_paused = true)]
    async fn poll_ceiling_exhaustion_fails() {
        let fetch = scripted(Vec::new()); // forever in_progress
        let err = poll_until_complete(fetch, Duration::from_secs(1), 3)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("did not complete within 3 polls"));
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_failure_status_stops_polling_immediately() {
        let fetch = scripted(vec![
            SendMessageResponse {
                message: None,
                run_status: "failed".into(),
            },
            done("never reached"),
        ]);
        let err = poll_until_complete(fetch, Duration::from_secs(1), 60)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("run ended as failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn completed_without_message_is_a_failure() {
        let fetch = scripted(vec![SendMessageResponse {
            message: None,
            run_status: "completed".into(),
        }]);
        let err = poll_until_complete(fetch, Duration::from_secs(1), 60)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("without a message"));
    }

    #[tokio::test]
    async fn mock_records_prompts_in_order() {
        let mock = MockConversation::new("t1")
            .push_question("첫 질문")
            .push_question("둘째 질문");

        assert_eq!(mock.create_thread().await.unwrap(), "t1");
        assert_eq!(mock.next_question("t1", "seed").await.unwrap(), "첫 질문");
        assert_eq!(mock.next_question("t1", "답변").await.unwrap(), "둘째 질문");

        let prompts = mock.prompts.lock().unwrap();
        assert_eq!(*prompts, vec!["seed".to_string(), "답변".to_string()]);
    }
}
