//! Speech synthesis client — `POST /speech-synthesis`.
//!
//! The proxy takes `{ "text": … }` and answers `{ "audio": … }` where `audio`
//! is a base64-encoded MP3.  [`HttpSynthesizer`] decodes the payload and
//! hands raw MP3 bytes to the playback sink.

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// SynthesisError
// ---------------------------------------------------------------------------

/// Errors raised while requesting or decoding synthesized speech.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// HTTP transport or connection error.
    #[error("synthesis request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("synthesis request timed out")]
    Timeout,

    /// The proxy answered with a non-2xx status.
    #[error("synthesis service returned HTTP {0}")]
    Status(u16),

    /// The response body could not be parsed.
    #[error("failed to parse synthesis response: {0}")]
    Parse(String),

    /// The `audio` field was not valid base64.
    #[error("failed to decode synthesized audio: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SynthesisError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SynthesisError::Timeout
        } else {
            SynthesisError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Synthesizer trait
// ---------------------------------------------------------------------------

/// Async seam for speech synthesis.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn Synthesizer>` across the orchestrator's subtasks.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesize `text` and return the encoded audio bytes (MP3).
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SynthesisResponse {
    audio: String,
}

// ---------------------------------------------------------------------------
// HttpSynthesizer
// ---------------------------------------------------------------------------

/// Calls the `/speech-synthesis` proxy endpoint.
pub struct HttpSynthesizer {
    client: reqwest::Client,
    url: String,
}

impl HttpSynthesizer {
    /// Build a synthesizer against `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            url: format!("{base_url}/speech-synthesis"),
        }
    }
}

#[async_trait]
impl Synthesizer for HttpSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let response = self
            .client
            .post(&self.url)
            .json(&SynthesisRequest { text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SynthesisError::Status(status.as_u16()));
        }

        let body: SynthesisResponse = response
            .json()
            .await
            .map_err(|e| SynthesisError::Parse(e.to_string()))?;

        base64::engine::general_purpose::STANDARD
            .decode(&body.audio)
            .map_err(|e| SynthesisError::Decode(e.to_string()))
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
        let synth = HttpSynthesizer::new("http://localhost:3000/api", 10);
        assert_eq!(synth.url, "http://localhost:3000/api/speech-synthesis");
    }

    #[test]
    fn request_body_serializes_text_field() {
        let body = serde_json::to_value(SynthesisRequest { text: "안녕하세요" }).unwrap();
        assert_eq!(body["text"], "안녕하세요");
    }

    #[test]
    fn response_audio_field_decodes() {
        let json = r#"{ "audio": "SGVsbG8=" }"#;
        let resp: SynthesisResponse = serde_json::from_str(json).unwrap();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&resp.audio)
            .unwrap();
        assert_eq!(bytes, b"Hello");
    }

    /// Verify that `HttpSynthesizer` is object-safe (usable as `dyn Synthesizer`).
    #[test]
    fn synthesizer_is_object_safe() {
        let synth: Box<dyn Synthesizer> = Box::new(HttpSynthesizer::new("http://x", 1));
        drop(synth);
    }
}
