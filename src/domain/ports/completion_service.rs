//! Completion service port - interface for language-model backends.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{CompletionRequest, CompletionResponse};

/// A service that continues a conversation, optionally requesting tool calls.
///
/// Each call is a single request/response round-trip. Implementations must
/// not retry; transport and API failures are returned as errors.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Backend name used in logs.
    fn name(&self) -> &'static str;

    /// Send the accumulated conversation and return the model's next turn.
    async fn complete(&self, request: CompletionRequest) -> DomainResult<CompletionResponse>;
}
