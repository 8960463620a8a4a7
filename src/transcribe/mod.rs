//! Transcription client — `POST /transcription`.
//!
//! The proxy takes a multipart form with `file` (audio blob), `model` and
//! `language` fields, and answers `{ "text": … }`.  The text comes back
//! verbatim: an empty or whitespace-only transcript is a usable result in
//! the interview flow (it is recorded as given) — only the microphone
//! self-test treats it as a failure.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// TranscribeError
// ---------------------------------------------------------------------------

/// Errors raised while uploading or transcribing an answer.
#[derive(Debug, Error)]
pub enum TranscribeError {
    /// HTTP transport or connection error.
    #[error("transcription request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("transcription request timed out")]
    Timeout,

    /// The proxy answered with a non-2xx status.
    #[error("transcription service returned HTTP {0}")]
    Status(u16),

    /// The response body could not be parsed.
    #[error("failed to parse transcription response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for TranscribeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TranscribeError::Timeout
        } else {
            TranscribeError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Transcriber trait
// ---------------------------------------------------------------------------

/// Async seam for speech-to-text.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn Transcriber>` across the orchestrator's subtasks.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Upload a WAV blob and return the recognized text verbatim.
    async fn transcribe(&self, wav: Vec<u8>) -> Result<String, TranscribeError>;
}

// ---------------------------------------------------------------------------
// HttpTranscriber
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Calls the `/transcription` proxy endpoint with a multipart upload.
pub struct HttpTranscriber {
    client: reqwest::Client,
    url: String,
    model: String,
    language: String,
}

impl HttpTranscriber {
    /// Build a transcriber against `base_url` with a per-request timeout.
    ///
    /// `model` and `language` are forwarded as form fields on every upload.
    pub fn new(base_url: &str, timeout_secs: u64, model: &str, language: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            url: format!("{base_url}/transcription"),
            model: model.to_string(),
            language: language.to_string(),
        }
    }
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, wav: Vec<u8>) -> Result<String, TranscribeError> {
        let file = reqwest::multipart::Part::bytes(wav)
            .file_name("answer.wav")
            .mime_str("audio/wav")
            .map_err(|e| TranscribeError::Request(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("language", self.language.clone());

        let response = self.client.post(&self.url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranscribeError::Status(status.as_u16()));
        }

        let body: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| TranscribeError::Parse(e.to_string()))?;

        Ok(body.text)
    }
}

// ---------------------------------------------------------------------------
// MockTranscriber (test double)
// ---------------------------------------------------------------------------

/// Scripted [`Transcriber`] for orchestrator and self-test tests.
#[cfg(test)]
pub struct MockTranscriber {
    result: Result<String, ()>,
}

#[cfg(test)]
impl MockTranscriber {
    /// Always succeeds with `text`.
    pub fn ok(text: &str) -> Self {
        Self {
            result: Ok(text.to_string()),
        }
    }

    /// Always fails with a non-2xx status.
    pub fn failing() -> Self {
        Self { result: Err(()) }
    }
}

#[cfg(test)]
#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, _wav: Vec<u8>) -> Result<String, TranscribeError> {
        match &self.result {
            Ok(text) => Ok(text.clone()),
            Err(()) => Err(TranscribeError::Status(502)),
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
        let t = HttpTranscriber::new("http://localhost:3000/api", 10, "whisper-1", "ko");
        assert_eq!(t.url, "http://localhost:3000/api/transcription");
        assert_eq!(t.model, "whisper-1");
        assert_eq!(t.language, "ko");
    }

    #[test]
    fn response_text_field_parses() {
        let json = r#"{ "text": "안녕하세요" }"#;
        let resp: TranscriptionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.text, "안녕하세요");
    }

    #[test]
    fn empty_text_is_a_valid_response() {
        let json = r#"{ "text": "" }"#;
        let resp: TranscriptionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.text, "");
    }

    /// Verify that `HttpTranscriber` is object-safe (usable as `dyn Transcriber`).
    #[test]
    fn transcriber_is_object_safe() {
        let t: Box<dyn Transcriber> = Box::new(HttpTranscriber::new("http://x", 1, "m", "ko"));
        drop(t);
    }

    #[tokio::test]
    async fn mock_returns_scripted_text() {
        let t = MockTranscriber::ok("대답");
        assert_eq!(t.transcribe(vec![0]).await.unwrap(), "대답");
    }

    #[tokio::test]
    async fn mock_failure_is_a_status_error() {
        let t = MockTranscriber::failing();
        assert!(matches!(
            t.transcribe(vec![0]).await,
            Err(TranscribeError::Status(502))
        ));
    }
}
