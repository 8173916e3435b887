use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::errors::DomainError;
use crate::infrastructure::logging::SecretScrubber;

use super::types::ErrorEnvelope;

/// Errors from the Anthropic Messages API.
#[derive(Error, Debug)]
pub enum AnthropicApiError {
    /// HTTP 400
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// HTTP 401 or 403
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// HTTP 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP 429
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// HTTP 529
    #[error("API overloaded")]
    Overloaded,

    /// Other 5xx statuses
    #[error("Server error ({0}): {1}")]
    ServerError(StatusCode, String),

    #[error("Request timeout")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("No API key configured (set ANTHROPIC_API_KEY or anthropic.api_key)")]
    MissingApiKey,

    #[error("Unexpected status ({0}): {1}")]
    Unknown(StatusCode, String),
}

impl AnthropicApiError {
    /// Classify a non-success response. Secrets in the body are scrubbed.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| body.to_string());
        let message = SecretScrubber::global().scrub(&message);

        match status.as_u16() {
            400 => Self::InvalidRequest(message),
            401 | 403 => Self::AuthenticationFailed(message),
            404 => Self::NotFound(message),
            429 => Self::RateLimitExceeded,
            529 => Self::Overloaded,
            500..=599 => Self::ServerError(status, message),
            _ => Self::Unknown(status, message),
        }
    }

    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Network(SecretScrubber::global().scrub(&error.to_string()))
        }
    }

    /// Whether retrying later could succeed. Only used for log context.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded
                | Self::Overloaded
                | Self::ServerError(_, _)
                | Self::Timeout
                | Self::Network(_)
        )
    }
}

impl From<AnthropicApiError> for DomainError {
    fn from(error: AnthropicApiError) -> Self {
        Self::CompletionFailed(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            AnthropicApiError::from_status(StatusCode::BAD_REQUEST, "bad"),
            AnthropicApiError::InvalidRequest(_)
        ));
        assert!(matches!(
            AnthropicApiError::from_status(StatusCode::FORBIDDEN, "no"),
            AnthropicApiError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            AnthropicApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            AnthropicApiError::RateLimitExceeded
        ));
        assert!(matches!(
            AnthropicApiError::from_status(StatusCode::from_u16(529).unwrap(), ""),
            AnthropicApiError::Overloaded
        ));
        assert!(matches!(
            AnthropicApiError::from_status(StatusCode::BAD_GATEWAY, "upstream"),
            AnthropicApiError::ServerError(StatusCode::BAD_GATEWAY, _)
        ));
    }

    #[test]
    fn test_error_envelope_message_extracted() {
        let body = r#"{"type":"error","error":{"type":"invalid_request_error","message":"max_tokens: too large"}}"#;
        let error = AnthropicApiError::from_status(StatusCode::BAD_REQUEST, body);
        assert_eq!(error.to_string(), "Invalid request: max_tokens: too large");
    }

    #[test]
    fn test_body_secrets_scrubbed() {
        let body = "invalid x-api-key sk-ant-REDACTED";
        let error = AnthropicApiError::from_status(StatusCode::UNAUTHORIZED, body);
        assert!(!error.to_string().contains("abcdefghijklmnop"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(AnthropicApiError::Overloaded.is_transient());
        assert!(AnthropicApiError::Timeout.is_transient());
        assert!(!AnthropicApiError::MissingApiKey.is_transient());
        assert!(!AnthropicApiError::InvalidRequest(String::new()).is_transient());
    }
}
