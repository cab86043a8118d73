//! WhatsApp Notifier
//!
//! Delivers the agent's final answer as a single outbound WhatsApp message
//! through Twilio's Messages API. The four required configuration values
//! are checked explicitly before any network call is made. No retry, no
//! delivery confirmation beyond the HTTP status.

use async_trait::async_trait;
use reqwest::Client;

use crate::config::TwilioSettings;
use crate::error::{Error, Result};
use crate::types::Notifier;

/// Twilio-backed WhatsApp sender for a single preconfigured recipient.
pub struct TwilioWhatsApp {
    settings: TwilioSettings,
    http: Client,
}

impl TwilioWhatsApp {
    pub fn new(settings: TwilioSettings) -> Self {
        Self {
            settings,
            http: Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.settings.account_sid
        )
    }
}

#[async_trait]
impl Notifier for TwilioWhatsApp {
    async fn send(&self, message: &str) -> Result<()> {
        // Precondition: fail fast before touching the network.
        self.settings.validate()?;

        let params = [
            ("Body", message),
            ("From", self.settings.from_number.as_str()),
            ("To", self.settings.to_number.as_str()),
        ];

        let response = self
            .http
            .post(self.messages_url())
            .basic_auth(
                &self.settings.account_sid,
                Some(&self.settings.auth_token),
            )
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::MessagingProvider(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::MessagingProvider(format!(
                "Twilio returned {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}
