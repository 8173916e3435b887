//! Subcommand implementations.

pub mod analyze;
pub mod serve;

pub use analyze::AnalyzeArgs;
pub use serve::ServeArgs;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::adapters::anthropic::AnthropicClient;
use crate::adapters::tavily::TavilySearchClient;
use crate::domain::models::Config;
use crate::domain::ports::{CompletionService, SearchService};
use crate::services::AnalysisPipeline;

/// Wire the pipeline to the live Anthropic and Tavily APIs.
pub(crate) fn live_pipeline(config: &Config) -> Result<AnalysisPipeline> {
    let completion: Arc<dyn CompletionService> = Arc::new(
        AnthropicClient::new(&config.anthropic).context("Failed to create Anthropic client")?,
    );
    let search: Arc<dyn SearchService> = Arc::new(
        TavilySearchClient::new(&config.search).context("Failed to create search client")?,
    );
    Ok(AnalysisPipeline::new(completion, search, config))
}
