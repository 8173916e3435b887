//! Agent roles and the per-agent result of one tool loop run.

use serde::{Deserialize, Serialize};

/// The five roles taking part in a product analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    /// Builds the strongest factual case for buying.
    Advocate,
    /// Finds what the advocate missed.
    Skeptic,
    /// Judges price timing and value.
    Economist,
    /// Lists products commonly bought instead.
    Alternatives,
    /// Synthesises the verdict. Never searches.
    Orchestrator,
}

impl AgentRole {
    /// Stable lowercase name used in events, logs and context keys.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Advocate => "advocate",
            Self::Skeptic => "skeptic",
            Self::Economist => "economist",
            Self::Alternatives => "alternatives",
            Self::Orchestrator => "orchestrator",
        }
    }

    /// Name used when the role is addressed in prompts.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Advocate => "Advocate",
            Self::Skeptic => "Skeptic",
            Self::Economist => "Economist",
            Self::Alternatives => "Alternatives",
            Self::Orchestrator => "Orchestrator",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model and budget settings for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Completion model identifier.
    pub model: String,
    /// Output token cap per completion call.
    pub max_tokens: u32,
    /// Number of searches the role may actually execute.
    pub search_budget: u32,
}

impl AgentProfile {
    pub fn new(model: impl Into<String>, max_tokens: u32, search_budget: u32) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            search_budget,
        }
    }
}

/// One executed search and the text fed back to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub query: String,
    pub result: String,
}

/// How a tool loop run ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    /// The model ended its turn with final text.
    Completed,
    /// Output hit the token cap (or the turn cap); `analysis` holds any partial text.
    Truncated,
    /// Unexpected stop indicator or abandoned submission; `analysis` is empty.
    Empty,
    /// The role's structured submission tool was called with accepted input.
    Submitted { input: serde_json::Value },
}

/// Output of one agent: final text plus the ordered reasoning/search trace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResult {
    /// Final text. May be empty.
    pub analysis: String,
    /// Text emitted before tool calls, in order.
    pub thinking_steps: Vec<String>,
    /// Executed searches, in order.
    pub searches: Vec<SearchRecord>,
}
