//! Pipeline orchestration: the tool loop, the agent roles built on it, and
//! the job machinery that streams their progress.

pub mod alternatives;
pub mod analysis_service;
pub mod analysts;
pub mod event_bus;
pub mod job_registry;
pub mod orchestrator;
pub mod pipeline;
pub mod prompts;
pub mod tool_loop;
pub mod tools;

pub use alternatives::AlternativesAgent;
pub use analysis_service::{AnalysisRequest, AnalysisService};
pub use analysts::AnalystAgent;
pub use event_bus::{job_channel, EventReceiver, JobEmitter};
pub use job_registry::{JobRegistry, JobStream};
pub use orchestrator::VerdictSynthesizer;
pub use pipeline::{AnalysisPipeline, PipelineReport};
pub use prompts::Brief;
pub use tool_loop::{LoopOutcome, LoopRequest, SubmissionTool, ToolLoop};
