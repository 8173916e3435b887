pub mod agent;
pub mod alternatives;
pub mod completion;
pub mod config;
pub mod context;
pub mod event;
pub mod job;
pub mod search;
pub mod verdict;

pub use agent::{AgentProfile, AgentResult, AgentRole, SearchRecord, Termination};
pub use alternatives::{Alternative, AlternativesResult};
pub use completion::{
    CompletionRequest, CompletionResponse, ContentBlock, Message, MessageRole, StopReason,
    ToolChoice, ToolSpec,
};
pub use config::{
    AgentsConfig, AnthropicConfig, Config, JobsConfig, LoggingConfig, SearchConfig, ServerConfig,
};
pub use context::PipelineContext;
pub use event::{AnalysisEvent, StepEvent};
pub use job::JobId;
pub use search::{format_hits, SearchHit};
pub use verdict::{Decision, Verdict, VerdictError};
