//! Search service port - interface for web search backends.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::SearchHit;

#[async_trait]
pub trait SearchService: Send + Sync {
    /// Backend name used in logs.
    fn name(&self) -> &'static str;

    /// Run one query and return hits in ranking order.
    async fn search(&self, query: &str) -> DomainResult<Vec<SearchHit>>;
}
