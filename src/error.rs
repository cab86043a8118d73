//! Error Taxonomy
//!
//! Every failure in the pipeline maps to one of these variants and
//! propagates unchanged to the shell boundary. Nothing is retried or
//! recovered internally.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Required secrets are missing or incomplete.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The web search provider call failed.
    #[error("search provider error: {0}")]
    SearchProvider(String),

    /// The model endpoint call failed (auth, network, malformed response).
    #[error("model endpoint error: {0}")]
    ModelEndpoint(String),

    /// The outbound messaging provider call failed.
    #[error("messaging provider error: {0}")]
    MessagingProvider(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_detail() {
        let err = Error::Configuration("Twilio credentials missing or incomplete".to_string());
        assert!(err.to_string().contains("Twilio credentials"));

        let err = Error::ModelEndpoint("401: invalid key".to_string());
        assert!(err.to_string().starts_with("model endpoint error"));
    }
}
