//! Bounded tool-use conversation shared by every searching agent.
//!
//! One `run` drives a single agent: send the history, inspect the stop
//! reason, execute requested searches within the agent's budget, feed the
//! results back, and repeat until the model finishes, truncates, submits a
//! structured result, or the turn cap is hit.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    format_hits, AgentProfile, AgentResult, AgentRole, AnalysisEvent, CompletionRequest,
    ContentBlock, Message, SearchRecord, StopReason, Termination, ToolSpec,
};
use crate::domain::ports::{CompletionService, SearchService};

use super::event_bus::JobEmitter;
use super::tools::SEARCH_TOOL;

/// Appended to the result of the call that uses up the budget.
pub const FINAL_ANALYSIS_NUDGE: &str =
    "You have enough information. Write your final analysis now.";

/// Returned instead of searching once the budget is spent.
pub const SEARCH_LIMIT_REACHED: &str = "Search limit reached. Write your final analysis now.";

/// Rejected submissions tolerated before the agent gives up.
const MAX_REJECTED_SUBMISSIONS: u32 = 2;

/// A tool whose valid invocation ends the loop instead of free text.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionTool {
    pub name: &'static str,
    pub validate: fn(&Value) -> Result<(), String>,
}

/// One agent's conversation parameters.
#[derive(Debug, Clone)]
pub struct LoopRequest {
    pub agent: AgentRole,
    pub profile: AgentProfile,
    pub system_prompt: String,
    pub initial_prompt: String,
    pub tools: Vec<ToolSpec>,
    pub submission: Option<SubmissionTool>,
    pub nudge: String,
    pub exhausted: String,
}

impl LoopRequest {
    pub fn new(
        agent: AgentRole,
        profile: AgentProfile,
        system_prompt: String,
        initial_prompt: String,
        tools: Vec<ToolSpec>,
    ) -> Self {
        Self {
            agent,
            profile,
            system_prompt,
            initial_prompt,
            tools,
            submission: None,
            nudge: FINAL_ANALYSIS_NUDGE.to_string(),
            exhausted: SEARCH_LIMIT_REACHED.to_string(),
        }
    }

    /// End the loop on a valid call to `tool` rather than on free text.
    #[must_use]
    pub fn with_submission(mut self, tool: SubmissionTool) -> Self {
        self.submission = Some(tool);
        self
    }

    #[must_use]
    pub fn with_nudge(mut self, nudge: impl Into<String>) -> Self {
        self.nudge = nudge.into();
        self
    }

    /// Reply sent for every tool call made after the budget is spent.
    #[must_use]
    pub fn with_exhausted_message(mut self, message: impl Into<String>) -> Self {
        self.exhausted = message.into();
        self
    }
}

/// What a finished loop produced and how it ended.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopOutcome {
    pub result: AgentResult,
    pub termination: Termination,
}

impl LoopOutcome {
    fn new(result: AgentResult, termination: Termination) -> Self {
        Self {
            result,
            termination,
        }
    }
}

#[derive(Default)]
struct LoopState {
    result: AgentResult,
    tool_calls: u32,
    rejected_submissions: u32,
}

fn notify(emit: Option<&JobEmitter>, event: AnalysisEvent) {
    if let Some(emitter) = emit {
        emitter.emit(event);
    }
}

/// Drives agents against the completion and search ports.
pub struct ToolLoop {
    completion: Arc<dyn CompletionService>,
    search: Arc<dyn SearchService>,
    max_snippet_chars: usize,
    max_turns: u32,
}

impl ToolLoop {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        search: Arc<dyn SearchService>,
        max_snippet_chars: usize,
        max_turns: u32,
    ) -> Self {
        Self {
            completion,
            search,
            max_snippet_chars,
            max_turns,
        }
    }

    /// Run one agent to completion.
    ///
    /// Only service failures are errors. Unexpected stop reasons, truncation
    /// and exhausted turns end the loop with whatever text exists.
    #[instrument(skip_all, fields(agent = %request.agent, budget = request.profile.search_budget))]
    pub async fn run(
        &self,
        request: &LoopRequest,
        emit: Option<&JobEmitter>,
    ) -> DomainResult<LoopOutcome> {
        let agent = request.agent;
        let mut messages = vec![Message::user_text(request.initial_prompt.clone())];
        let mut state = LoopState::default();

        for turn in 1..=self.max_turns {
            let response = self
                .completion
                .complete(CompletionRequest {
                    agent,
                    model: request.profile.model.clone(),
                    system: request.system_prompt.clone(),
                    messages: messages.clone(),
                    tools: request.tools.clone(),
                    max_tokens: request.profile.max_tokens,
                    tool_choice: None,
                })
                .await?;
            debug!(turn, stop_reason = %response.stop_reason, "completion returned");

            match &response.stop_reason {
                StopReason::EndTurn => {
                    state.result.analysis = response.text();
                    if request.submission.is_none() {
                        notify(
                            emit,
                            AnalysisEvent::Analysis {
                                agent,
                                text: state.result.analysis.clone(),
                            },
                        );
                    }
                    info!(
                        turn,
                        searches = state.result.searches.len(),
                        "agent finished"
                    );
                    return Ok(LoopOutcome::new(state.result, Termination::Completed));
                }
                StopReason::MaxTokens => {
                    state.result.analysis = response.text();
                    warn!(turn, "output truncated at max_tokens");
                    return Ok(LoopOutcome::new(state.result, Termination::Truncated));
                }
                StopReason::Other(reason) => {
                    warn!(turn, stop_reason = %reason, "unexpected stop reason");
                    return Ok(LoopOutcome::new(state.result, Termination::Empty));
                }
                StopReason::ToolUse => {}
            }

            let mut tool_results = Vec::new();
            for block in &response.content {
                match block {
                    ContentBlock::Text { text } if !text.trim().is_empty() => {
                        state.result.thinking_steps.push(text.clone());
                        notify(emit, AnalysisEvent::think(agent, text.clone()));
                    }
                    ContentBlock::ToolUse { id, name, input } => {
                        if let Some(tool) = request.submission.filter(|t| t.name == name.as_str()) {
                            match (tool.validate)(input) {
                                Ok(()) => {
                                    info!(turn, tool = tool.name, "submission accepted");
                                    return Ok(LoopOutcome::new(
                                        state.result,
                                        Termination::Submitted {
                                            input: input.clone(),
                                        },
                                    ));
                                }
                                Err(reason) => {
                                    state.rejected_submissions += 1;
                                    warn!(turn, tool = tool.name, %reason, "submission rejected");
                                    if state.rejected_submissions >= MAX_REJECTED_SUBMISSIONS {
                                        return Ok(LoopOutcome::new(
                                            state.result,
                                            Termination::Empty,
                                        ));
                                    }
                                    tool_results.push(ContentBlock::tool_error(
                                        id.clone(),
                                        format!(
                                            "Submission rejected: {reason}. Fix it and call {} again.",
                                            tool.name
                                        ),
                                    ));
                                }
                            }
                            continue;
                        }
                        let result = self
                            .execute_tool(request, &mut state, id, name, input, emit)
                            .await?;
                        tool_results.push(result);
                    }
                    _ => {}
                }
            }

            if tool_results.is_empty() {
                warn!(turn, "tool_use stop without any tool call");
                return Ok(LoopOutcome::new(state.result, Termination::Empty));
            }
            messages.push(Message::assistant(response.content));
            messages.push(Message::user(tool_results));
        }

        warn!(max_turns = self.max_turns, "turn limit reached");
        Ok(LoopOutcome::new(state.result, Termination::Truncated))
    }

    /// Answer one non-submission tool call. Every such call counts toward
    /// the budget, including ones that cannot be executed.
    async fn execute_tool(
        &self,
        request: &LoopRequest,
        state: &mut LoopState,
        id: &str,
        name: &str,
        input: &Value,
        emit: Option<&JobEmitter>,
    ) -> DomainResult<ContentBlock> {
        let agent = request.agent;
        let budget = request.profile.search_budget;
        state.tool_calls += 1;
        let call = state.tool_calls;

        if call > budget {
            debug!(call, budget, "search budget exhausted");
            return Ok(ContentBlock::tool_result(id, request.exhausted.as_str()));
        }

        let query = input
            .get("query")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|q| !q.is_empty());

        let (mut content, is_error) = match (name, query) {
            (SEARCH_TOOL, Some(query)) => {
                notify(emit, AnalysisEvent::search(agent, query));
                info!(search_count = call, query, "searching");
                let hits = self.search.search(query).await?;
                let text = format_hits(&hits, self.max_snippet_chars);
                state.result.searches.push(SearchRecord {
                    query: query.to_string(),
                    result: text.clone(),
                });
                (text, false)
            }
            (SEARCH_TOOL, None) => (
                format!("The `{SEARCH_TOOL}` tool requires a non-empty `query` string."),
                true,
            ),
            (other, _) => {
                warn!(tool = other, "model requested an unknown tool");
                (
                    format!("Unknown tool `{other}`. Only `{SEARCH_TOOL}` is available."),
                    true,
                )
            }
        };

        if call == budget {
            content.push_str("\n\n");
            content.push_str(&request.nudge);
            notify(emit, AnalysisEvent::WritingStart { agent });
        }

        Ok(if is_error {
            ContentBlock::tool_error(id, content)
        } else {
            ContentBlock::tool_result(id, content)
        })
    }
}
