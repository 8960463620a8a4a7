//! Contact-number normalization and the single cached intake entry.
//!
//! The wizard captures a phone number during intake and reads it back exactly
//! once — to populate the webhook payload at session end.  The cache is one
//! JSON file in the platform config directory.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::AppPaths;

// ---------------------------------------------------------------------------
// normalize_contact
// ---------------------------------------------------------------------------

/// Normalize a raw contact-number string into hyphenated form.
///
/// Strips everything that is not an ASCII digit, then hyphenates by length:
///
/// * 11 digits → `XXX-XXXX-XXXX` (e.g. `010-1234-5678`)
/// * 10 digits → `XXX-XXX-XXXX`  (e.g. `011-123-4567`)
/// * any other length → the bare digit string, unhyphenated
///
/// # Example
///
/// ```
/// use voice_interview::contact::normalize_contact;
///
/// assert_eq!(normalize_contact("010 1234 5678"), "010-1234-5678");
/// assert_eq!(normalize_contact("(011) 123-4567"), "011-123-4567");
/// ```
pub fn normalize_contact(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        11 => format!("{}-{}-{}", &digits[0..3], &digits[3..7], &digits[7..11]),
        10 => format!("{}-{}-{}", &digits[0..3], &digits[3..6], &digits[6..10]),
        _ => digits,
    }
}

// ---------------------------------------------------------------------------
// ContactStore
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct ContactEntry {
    contact: String,
}

/// Persists the single contact-number entry captured during intake.
pub struct ContactStore {
    path: PathBuf,
}

impl ContactStore {
    /// Store backed by the platform config directory (`contact.json`).
    pub fn new() -> Self {
        Self {
            path: AppPaths::new().contact_file,
        }
    }

    /// Store backed by an explicit path (useful for tests).
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Save the (already normalized) contact number, creating parent
    /// directories as needed.
    pub fn save(&self, contact: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let entry = ContactEntry {
            contact: contact.to_string(),
        };
        std::fs::write(&self.path, serde_json::to_string_pretty(&entry)?)?;
        Ok(())
    }

    /// Read the cached contact number back, or `None` when nothing was
    /// captured (missing or unreadable file).
    pub fn load(&self) -> Option<String> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        let entry: ContactEntry = serde_json::from_str(&content).ok()?;
        Some(entry.contact)
    }
}

impl Default for ContactStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
