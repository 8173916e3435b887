//! Search service backed by the Tavily search API.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{SearchConfig, SearchHit};
use crate::domain::ports::SearchService;
use crate::infrastructure::logging::SecretScrubber;

#[derive(Error, Debug)]
pub enum SearchApiError {
    #[error("Invalid search request: {0}")]
    InvalidRequest(String),

    #[error("Search authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Search rate limit exceeded")]
    RateLimitExceeded,

    #[error("Search server error ({0}): {1}")]
    ServerError(StatusCode, String),

    #[error("Search request timeout")]
    Timeout,

    #[error("Search network error: {0}")]
    Network(String),

    #[error("Failed to decode search response: {0}")]
    Decode(String),

    #[error("No search API key configured (set TAVILY_API_KEY or search.api_key)")]
    MissingApiKey,

    #[error("Unexpected search status ({0}): {1}")]
    Unknown(StatusCode, String),
}

impl SearchApiError {
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = SecretScrubber::global().scrub(body);
        match status.as_u16() {
            400 | 422 => Self::InvalidRequest(message),
            401 | 403 => Self::AuthenticationFailed(message),
            429 | 432 | 433 => Self::RateLimitExceeded,
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
}

impl From<SearchApiError> for DomainError {
    fn from(error: SearchApiError) -> Self {
        Self::SearchFailed(error.to_string())
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    search_depth: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

/// `POST /search` client. Hits are returned whole; snippets are bounded
/// when they are rendered for the model.
pub struct TavilySearchClient {
    client: Client,
    api_key: String,
    base_url: String,
    search_depth: String,
}

impl TavilySearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self, SearchApiError> {
        let api_key = config
            .resolved_api_key()
            .ok_or(SearchApiError::MissingApiKey)?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(
        config: &SearchConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, SearchApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SearchApiError::from_reqwest(&e))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            search_depth: config.search_depth.clone(),
        })
    }
}

#[async_trait]
impl SearchService for TavilySearchClient {
    fn name(&self) -> &'static str {
        "tavily"
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> DomainResult<Vec<SearchHit>> {
        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(&self.api_key)
            .json(&SearchRequest {
                query,
                search_depth: &self.search_depth,
            })
            .send()
            .await
            .map_err(|e| SearchApiError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = SearchApiError::from_status(status, &body);
            warn!(%status, error = %error, "search request failed");
            return Err(error.into());
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchApiError::from_reqwest(&e))?;
        debug!(hits = parsed.results.len(), "search completed");

        Ok(parsed
            .results
            .into_iter()
            .map(|r| SearchHit::new(r.title, r.url, r.content))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            SearchApiError::from_status(StatusCode::UNAUTHORIZED, "bad key"),
            SearchApiError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            SearchApiError::from_status(StatusCode::from_u16(432).unwrap(), "plan limit"),
            SearchApiError::RateLimitExceeded
        ));
        assert!(matches!(
            SearchApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "oops"),
            SearchApiError::ServerError(_, _)
        ));
    }

    #[test]
    fn test_converts_to_search_failed() {
        let error: DomainError = SearchApiError::Timeout.into();
        assert!(matches!(error, DomainError::SearchFailed(msg) if msg == "Search request timeout"));
    }

    #[test]
    fn test_missing_key_rejected() {
        temp_env::with_var_unset("TAVILY_API_KEY", || {
            assert!(matches!(
                TavilySearchClient::new(&SearchConfig::default()),
                Err(SearchApiError::MissingApiKey)
            ));
        });
    }
}
