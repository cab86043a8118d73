//! Configuration
//!
//! All settings are read from the process environment exactly once at
//! startup into an explicit `Settings` struct and passed into component
//! constructors. Component logic never reads the environment ad hoc.

use std::env;

use crate::error::{Error, Result};

/// Default OpenAI-compatible base URL for Google's generative language API.
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Default model identifier.
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default max tokens per completion.
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Process-wide settings, constructed once at startup.
#[derive(Clone, Debug)]
pub struct Settings {
    /// API key for the model endpoint. May be empty; absence surfaces on
    /// the first model call rather than at load time.
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub twilio: TwilioSettings,
}

/// The four values the notification sender requires.
#[derive(Clone, Debug, Default)]
pub struct TwilioSettings {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender channel identifier (e.g. `whatsapp:+14155238886`).
    pub from_number: String,
    /// Recipient channel identifier.
    pub to_number: String,
}

impl TwilioSettings {
    /// Fail fast when any of the four values is absent or empty.
    /// Checked before any delivery attempt is made.
    pub fn validate(&self) -> Result<()> {
        let complete = !self.account_sid.is_empty()
            && !self.auth_token.is_empty()
            && !self.from_number.is_empty()
            && !self.to_number.is_empty();

        if complete {
            Ok(())
        } else {
            Err(Error::Configuration(
                "Twilio credentials missing or incomplete".to_string(),
            ))
        }
    }
}

impl Settings {
    /// Build settings from the process environment. Missing values become
    /// empty strings so the responsible component can report them with a
    /// precise error instead of failing at load time.
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            model: env::var("RISHTA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            max_tokens: env::var("RISHTA_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_TOKENS),
            twilio: TwilioSettings {
                account_sid: env::var("TWILIO_ACCOUNT_SID").unwrap_or_default(),
                auth_token: env::var("TWILIO_AUTH_TOKEN").unwrap_or_default(),
                from_number: env::var("TWILIO_WHATSAPP_NUMBER").unwrap_or_default(),
                to_number: env::var("MY_WHATSAPP_NUMBER").unwrap_or_default(),
            },
        }
    }

    /// Rows for the debug panel: which values are present, secrets masked.
    pub fn debug_report(&self) -> Vec<(&'static str, String)> {
        vec![
            ("TWILIO_ACCOUNT_SID", mask_secret(&self.twilio.account_sid)),
            ("TWILIO_AUTH_TOKEN", mask_secret(&self.twilio.auth_token)),
            (
                "TWILIO_WHATSAPP_NUMBER",
                present_or_not(&self.twilio.from_number),
            ),
            ("MY_WHATSAPP_NUMBER", present_or_not(&self.twilio.to_number)),
            ("GEMINI_API_KEY", mask_secret(&self.gemini_api_key)),
        ]
    }
}

/// Mask a secret for display. At most a four-character prefix is ever shown.
fn mask_secret(value: &str) -> String {
    if value.is_empty() {
        return "(not set)".to_string();
    }
    // Count chars, not bytes: slicing a byte offset can split a multibyte
    // character and short multibyte values must not leak whole.
    if value.chars().count() <= 4 {
        "****".to_string()
    } else {
        let prefix: String = value.chars().take(4).collect();
        format!("{}****", prefix)
    }
}

/// Non-secret values are shown as-is, or flagged as absent.
fn present_or_not(value: &str) -> String {
    if value.is_empty() {
        "(not set)".to_string()
    } else {
        value.to_string()
    }
}
