//! shouldibuy - multi-agent purchase analysis
//!
//! Given a product name, three analysts (Advocate, Skeptic, Economist)
//! research it in sequence while an Alternatives agent runs alongside them.
//! The Orchestrator then synthesises a single verdict. Progress streams to
//! the caller as typed events.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and the completion/search ports
//! - **Service Layer** (`services`): tool loop, agents, pipeline and job machinery
//! - **Adapters** (`adapters`): Anthropic and Tavily clients, HTTP/SSE server, mocks
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use shouldibuy::adapters::anthropic::AnthropicClient;
//! use shouldibuy::adapters::tavily::TavilySearchClient;
//! use shouldibuy::{AnalysisPipeline, ConfigLoader};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load(None)?;
//!     let pipeline = AnalysisPipeline::new(
//!         Arc::new(AnthropicClient::new(&config.anthropic)?),
//!         Arc::new(TavilySearchClient::new(&config.search)?),
//!         &config,
//!     );
//!     let report = pipeline.execute("Sony WH-1000XM5", None, None).await?;
//!     println!("{}", report.verdict.decision);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    AgentProfile, AgentResult, AgentRole, Alternative, AnalysisEvent, Config, Decision, JobId,
    Verdict,
};
pub use domain::ports::{CompletionService, SearchService};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{AnalysisPipeline, AnalysisService, JobRegistry, PipelineReport};
