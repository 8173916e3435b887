//! Events streamed to the consumer of one analysis job.

use serde::{Deserialize, Serialize};

use super::agent::AgentRole;
use super::alternatives::Alternative;
use super::verdict::Verdict;

/// An intermediate step taken by an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StepEvent {
    /// Reasoning text emitted before a tool call.
    Think { text: String },
    /// A search about to be executed.
    Search { query: String },
}

/// Tagged union of everything a job emits, serialized as `{"type": ...}` JSON.
///
/// Events are immutable once emitted and reach the consumer in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisEvent {
    Step { agent: AgentRole, step: StepEvent },
    Analysis { agent: AgentRole, text: String },
    Alternatives { data: Vec<Alternative> },
    WritingStart { agent: AgentRole },
    Verdict { data: Verdict },
    Done,
    Error { message: String },
}

impl AnalysisEvent {
    pub fn think(agent: AgentRole, text: impl Into<String>) -> Self {
        Self::Step {
            agent,
            step: StepEvent::Think { text: text.into() },
        }
    }

    pub fn search(agent: AgentRole, query: impl Into<String>) -> Self {
        Self::Step {
            agent,
            step: StepEvent::Search {
                query: query.into(),
            },
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Short name of the variant, matching the JSON `type` tag.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Step { .. } => "step",
            Self::Analysis { .. } => "analysis",
            Self::Alternatives { .. } => "alternatives",
            Self::WritingStart { .. } => "writing_start",
            Self::Verdict { .. } => "verdict",
            Self::Done => "done",
            Self::Error { .. } => "error",
        }
    }

    /// Agent the event belongs to, if any.
    pub const fn agent(&self) -> Option<AgentRole> {
        match self {
            Self::Step { agent, .. } | Self::Analysis { agent, .. } | Self::WritingStart { agent } => {
                Some(*agent)
            }
            Self::Alternatives { .. } => Some(AgentRole::Alternatives),
            Self::Verdict { .. } => Some(AgentRole::Orchestrator),
            Self::Done | Self::Error { .. } => None,
        }
    }
}
