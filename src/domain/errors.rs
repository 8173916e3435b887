//! Domain errors for the purchase analysis engine.

use thiserror::Error;

use crate::domain::models::AgentRole;

/// Domain-level errors that can occur while analysing a product.
///
/// Every variant is a hard failure from the pipeline's point of view: the
/// job stops, its stream receives a single `error` event, and the queue closes.
/// Soft failures (an agent ending with no text) are not errors; they surface
/// as an empty `AgentResult::analysis`.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Completion service failed: {0}")]
    CompletionFailed(String),

    #[error("Search service failed: {0}")]
    SearchFailed(String),

    #[error("Malformed output from {agent}: {reason}")]
    MalformedOutput { agent: AgentRole, reason: String },

    #[error("Context for {0} was already recorded")]
    DuplicateContext(AgentRole),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Job {0} already has a consumer")]
    JobAlreadyAttached(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for DomainError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            DomainError::ExecutionFailed("agent task panicked".to_string())
        } else {
            DomainError::ExecutionFailed("agent task was cancelled".to_string())
        }
    }
}
