//! End-of-session transcript delivery.
//!
//! When the interview ends the accumulated transcript is serialized and
//! posted to an outbound webhook together with the normalized contact
//! number.  Delivery failure is logged by the orchestrator and never
//! surfaced — it must not block session completion.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DeliveryError
// ---------------------------------------------------------------------------

/// Errors raised while posting the final transcript.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// HTTP transport or connection error.
    #[error("webhook request failed: {0}")]
    Request(String),

    /// The webhook did not answer within the configured timeout.
    #[error("webhook request timed out")]
    Timeout,

    /// The webhook answered with a non-2xx status.
    #[error("webhook returned HTTP {0}")]
    Status(u16),
}

impl From<reqwest::Error> for DeliveryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            DeliveryError::Timeout
        } else {
            DeliveryError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// DeliveryPayload
// ---------------------------------------------------------------------------

/// The webhook body: one delimited transcript string plus the contact number
/// captured during intake.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DeliveryPayload {
    /// Normalized contact number (`XXX-XXXX-XXXX` / `XXX-XXX-XXXX`), empty
    /// when intake captured nothing.
    pub contact: String,
    /// Serialized question/answer transcript.
    pub transcript: String,
}

// ---------------------------------------------------------------------------
// TranscriptDelivery trait
// ---------------------------------------------------------------------------

/// Async seam for the delivery collaborator.
#[async_trait]
pub trait TranscriptDelivery: Send + Sync {
    /// Attempt one delivery of `payload`.
    async fn deliver(&self, payload: &DeliveryPayload) -> Result<(), DeliveryError>;
}

// ---------------------------------------------------------------------------
// WebhookDelivery
// ---------------------------------------------------------------------------

/// Posts the payload as JSON to a fixed webhook URL.
pub struct WebhookDelivery {
    client: reqwest::Client,
    url: String,
}

impl WebhookDelivery {
    pub fn new(url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl TranscriptDelivery for WebhookDelivery {
    async fn deliver(&self, payload: &DeliveryPayload) -> Result<(), DeliveryError> {
        let response = self.client.post(&self.url).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status.as_u16()));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockDelivery (test double)
// ---------------------------------------------------------------------------

/// Records every delivery attempt; optionally fails them all.
#[cfg(test)]
pub struct MockDelivery {
    fail: bool,
    /// Every payload handed to `deliver`, in order.
    pub attempts: std::sync::Mutex<Vec<DeliveryPayload>>,
}

#[cfg(test)]
impl MockDelivery {
    pub fn new() -> Self {
        Self {
            fail: false,
            attempts: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            attempts: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl TranscriptDelivery for MockDelivery {
    async fn deliver(&self, payload: &DeliveryPayload) -> Result<(), DeliveryError> {
        self.attempts.lock().unwrap().push(payload.clone());
        if self.fail {
            Err(DeliveryError::Status(500))
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
