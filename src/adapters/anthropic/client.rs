//! Anthropic Messages API client.

use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::{AnthropicConfig, CompletionRequest, CompletionResponse};
use crate::domain::ports::CompletionService;

use super::errors::AnthropicApiError;
use super::types::{MessagesRequest, MessagesResponse};

/// Non-streaming `POST /v1/messages` client. Failures are never retried.
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    base_url: String,
    api_version: String,
}

impl AnthropicClient {
    /// Build a client from configuration, resolving the API key from the
    /// environment when the config leaves it unset.
    pub fn new(config: &AnthropicConfig) -> Result<Self, AnthropicApiError> {
        let api_key = config
            .resolved_api_key()
            .ok_or(AnthropicApiError::MissingApiKey)?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(
        config: &AnthropicConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, AnthropicApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AnthropicApiError::from_reqwest(&e))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

#[async_trait]
impl CompletionService for AnthropicClient {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    #[instrument(skip_all, fields(agent = %request.agent, model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> DomainResult<CompletionResponse> {
        let body = MessagesRequest::from(&request);

        let response = self
            .client
            .post(self.messages_url())
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| AnthropicApiError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = AnthropicApiError::from_status(status, &body);
            warn!(%status, transient = error.is_transient(), error = %error, "completion request failed");
            return Err(error.into());
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AnthropicApiError::from_reqwest(&e))?;

        debug!(
            message_id = %parsed.id,
            stop_reason = parsed.stop_reason.as_deref().unwrap_or("none"),
            input_tokens = parsed.usage.as_ref().map_or(0, |u| u.input_tokens),
            output_tokens = parsed.usage.as_ref().map_or(0, |u| u.output_tokens),
            "completion received"
        );
        Ok(parsed.into())
    }
}
