//! Provider-neutral message types exchanged with the completion service.
//!
//! Content blocks are an explicit tagged variant: a response block is either
//! free text or a named tool invocation, decided by the service adapter when
//! it decodes the wire format.

use serde_json::Value;

use super::agent::AgentRole;

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
}

/// One block of message content.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    /// Free text.
    Text { text: String },
    /// A request by the model to invoke a named tool.
    ToolUse { id: String, name: String, input: Value },
    /// The caller's answer to a `ToolUse` block.
    ToolResult {
        tool_use_id: String,
        content: String,
        is_error: bool,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    pub fn tool_error(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error: true,
        }
    }
}

/// A conversation turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: MessageRole,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: vec![ContentBlock::text(text)],
        }
    }

    pub fn user(content: Vec<ContentBlock>) -> Self {
        Self {
            role: MessageRole::User,
            content,
        }
    }

    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content,
        }
    }
}

/// A tool the model may invoke, with its JSON schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Constraint on which tool the model must call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolChoice {
    /// Model decides.
    Auto,
    /// Model must call the named tool.
    Tool { name: String },
}

/// Everything the completion service needs for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Role issuing the call. Used for tracing and routing in tests.
    pub agent: AgentRole,
    pub model: String,
    pub system: String,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolSpec>,
    pub max_tokens: u32,
    pub tool_choice: Option<ToolChoice>,
}

/// Why the model stopped producing output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    /// Anything else the service reports (stop sequences, refusals, missing).
    Other(String),
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EndTurn => f.write_str("end_turn"),
            Self::ToolUse => f.write_str("tool_use"),
            Self::MaxTokens => f.write_str("max_tokens"),
            Self::Other(reason) => write!(f, "other({reason})"),
        }
    }
}

/// The service's answer to a `CompletionRequest`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub stop_reason: StopReason,
    pub content: Vec<ContentBlock>,
}

impl CompletionResponse {
    pub fn new(stop_reason: StopReason, content: Vec<ContentBlock>) -> Self {
        Self {
            stop_reason,
            content,
        }
    }

    /// A final answer consisting of one text block.
    pub fn end_turn(text: impl Into<String>) -> Self {
        Self::new(StopReason::EndTurn, vec![ContentBlock::text(text)])
    }

    /// All non-empty text blocks joined by newlines.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } if !text.trim().is_empty() => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Input of the first tool invocation with the given name.
    pub fn tool_input(&self, name: &str) -> Option<&Value> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::ToolUse {
                name: tool, input, ..
            } if tool == name => Some(input),
            _ => None,
        })
    }
}
