//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// ServicesConfig
// ---------------------------------------------------------------------------

/// Connection settings for the three proxy endpoints.
///
/// The proxies live under one base URL:
///
/// - `POST {base_url}/speech-synthesis`
/// - `POST {base_url}/transcription`
/// - `POST {base_url}/conversation`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Base URL of the proxy server (no trailing slash).
    pub base_url: String,
    /// Per-request timeout in seconds for all three endpoints.
    pub timeout_secs: u64,
    /// Transcription model identifier forwarded as the `model` form field.
    pub model: String,
    /// ISO-639-1 language code forwarded as the `language` form field.
    pub language: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".into(),
            timeout_secs: 30,
            model: "whisper-1".into(),
            language: "ko".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// InterviewConfig
// ---------------------------------------------------------------------------

/// Settings for the interview turn loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewConfig {
    /// Literal prompt sent on the first `next_question` call, before any
    /// answer exists.
    pub seed_prompt: String,
    /// Seconds between run-status polls while a question is generating.
    pub poll_interval_secs: u64,
    /// Maximum number of polls before the question request is abandoned.
    pub poll_ceiling: u32,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            seed_prompt: "면접을 시작합니다. 첫 번째 질문을 해주세요.".into(),
            poll_interval_secs: 1,
            poll_ceiling: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Settings for microphone capture and the waveform feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Target sample rate in Hz for the transcription artifact.
    pub sample_rate: u32,
    /// Number of amplitude bars per waveform frame.
    pub waveform_bars: usize,
    /// Seconds of audio recorded by the microphone self-test.
    pub self_test_secs: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            waveform_bars: 24,
            self_test_secs: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// WebhookConfig
// ---------------------------------------------------------------------------

/// End-of-session transcript delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Destination URL for the final transcript payload.
    pub url: String,
    /// Seconds to wait for the webhook before giving up (failure is only
    /// logged either way).
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000/api/interview-complete".into(),
            timeout_secs: 15,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use voice_interview::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote service endpoints.
    pub services: ServicesConfig,
    /// Interview turn-loop settings.
    pub interview: InterviewConfig,
    /// Microphone capture settings.
    pub audio: AudioConfig,
    /// Transcript delivery settings.
    pub webhook: WebhookConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
