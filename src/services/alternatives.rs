//! Alternatives agent: searches briefly, then submits a structured list.

use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AgentProfile, AgentRole, Alternative, AlternativesResult, AnalysisEvent, Termination,
};

use super::event_bus::JobEmitter;
use super::prompts::{self, Brief};
use super::tool_loop::{LoopRequest, SubmissionTool, ToolLoop};
use super::tools::{search_tool, submit_alternatives_tool, SUBMIT_ALTERNATIVES_TOOL};

/// Nudge appended when the Alternatives agent spends its last search.
pub const SUBMIT_NUDGE: &str = "You have enough information. Call submit_alternatives now.";

/// Reply to searches attempted after the budget is spent.
pub const SEARCH_EXHAUSTED: &str = "Search limit reached. Call submit_alternatives now.";

fn validate_submission(input: &serde_json::Value) -> Result<(), String> {
    Alternative::parse_submission(input).map(|_| ())
}

pub struct AlternativesAgent {
    tool_loop: Arc<ToolLoop>,
    profile: AgentProfile,
}

impl AlternativesAgent {
    pub fn new(tool_loop: Arc<ToolLoop>, profile: AgentProfile) -> Self {
        Self { tool_loop, profile }
    }

    /// Find 3-5 alternatives to `product`.
    ///
    /// Finishing without a valid submission yields an empty list, not an error.
    pub async fn run(
        &self,
        product: &str,
        emit: Option<&JobEmitter>,
    ) -> DomainResult<AlternativesResult> {
        let brief = Brief::new(product, None);
        let request = LoopRequest::new(
            AgentRole::Alternatives,
            self.profile.clone(),
            prompts::alternatives_system(&brief, self.profile.search_budget),
            prompts::alternatives_request(product),
            vec![
                search_tool("product alternatives and price comparisons"),
                submit_alternatives_tool(),
            ],
        )
        .with_submission(SubmissionTool {
            name: SUBMIT_ALTERNATIVES_TOOL,
            validate: validate_submission,
        })
        .with_nudge(SUBMIT_NUDGE)
        .with_exhausted_message(SEARCH_EXHAUSTED);

        // Runs in parallel with the chain; only the final list is streamed.
        let outcome = self.tool_loop.run(&request, None).await?;
        let alternatives = match outcome.termination {
            Termination::Submitted { input } => {
                Alternative::parse_submission(&input).map_err(|reason| {
                    DomainError::MalformedOutput {
                        agent: AgentRole::Alternatives,
                        reason,
                    }
                })?
            }
            other => {
                tracing::info!(termination = ?other, "no alternatives submitted");
                Vec::new()
            }
        };

        if !alternatives.is_empty() {
            tracing::info!(count = alternatives.len(), "alternatives found");
            if let Some(emitter) = emit {
                emitter.emit(AnalysisEvent::Alternatives {
                    data: alternatives.clone(),
                });
            }
        }

        Ok(AlternativesResult {
            alternatives,
            searches: outcome.result.searches,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{search_turn, tool_turn, ScriptedCompletionService, StaticSearchService};
    use crate::domain::models::{CompletionResponse, JobId};
    use crate::services::event_bus::job_channel;
    use serde_json::json;

    fn agent(completion: Arc<ScriptedCompletionService>) -> AlternativesAgent {
        let search = Arc::new(StaticSearchService::new(Vec::new()));
        AlternativesAgent::new(
            Arc::new(ToolLoop::new(completion, search, 500, 30)),
            AgentProfile::new("claude-haiku-4-5", 1024, 3),
        )
    }

    fn three() -> serde_json::Value {
        json!({"alternatives": [
            {"name": "Bose QuietComfort Ultra", "price": "$379", "note": "Folds flat."},
            {"name": "Sony WH-1000XM4", "price": "$248", "note": "Same ANC for less."},
            {"name": "Apple AirPods Max", "price": "$449", "note": "Best for iPhone owners."}
        ]})
    }

    #[tokio::test]
    async fn test_submission_emits_alternatives() {
        let completion = Arc::new(ScriptedCompletionService::new());
        completion.push(AgentRole::Alternatives, search_turn("", "xm5 vs"));
        completion.push(
            AgentRole::Alternatives,
            tool_turn(SUBMIT_ALTERNATIVES_TOOL, three()),
        );
        let (emitter, mut rx) = job_channel(JobId::new());

        let result = agent(completion.clone())
            .run("Sony WH-1000XM5", Some(&emitter))
            .await
            .unwrap();
        drop(emitter);

        assert_eq!(result.alternatives.len(), 3);
        assert_eq!(result.searches.len(), 1);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert_eq!(events.len(), 1, "unexpected events: {events:?}");
        assert!(matches!(&events[0], AnalysisEvent::Alternatives { data } if data.len() == 3));

        let request = &completion.requests_for(AgentRole::Alternatives)[0];
        assert_eq!(request.model, "claude-haiku-4-5");
        assert_eq!(request.tools.len(), 2);
    }

    #[tokio::test]
    async fn test_end_turn_without_submission_is_empty() {
        let completion = Arc::new(ScriptedCompletionService::new());
        completion.push(
            AgentRole::Alternatives,
            CompletionResponse::end_turn("Here are some ideas..."),
        );
        let (emitter, mut rx) = job_channel(JobId::new());

        let result = agent(completion)
            .run("Sony WH-1000XM5", Some(&emitter))
            .await
            .unwrap();
        drop(emitter);

        assert!(result.alternatives.is_empty());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_two_invalid_submissions_give_up() {
        let completion = Arc::new(ScriptedCompletionService::new());
        let too_few = json!({"alternatives": [{"name": "A", "price": "$1", "note": "n"}]});
        completion.push(
            AgentRole::Alternatives,
            tool_turn(SUBMIT_ALTERNATIVES_TOOL, too_few.clone()),
        );
        completion.push(
            AgentRole::Alternatives,
            tool_turn(SUBMIT_ALTERNATIVES_TOOL, too_few),
        );

        let result = agent(completion.clone())
            .run("Sony WH-1000XM5", None)
            .await
            .unwrap();

        assert!(result.alternatives.is_empty());
        assert_eq!(completion.requests_for(AgentRole::Alternatives).len(), 2);
    }

    #[tokio::test]
    async fn test_searches_past_budget_are_told_to_submit() {
        let completion = Arc::new(ScriptedCompletionService::new());
        for n in 1..=4 {
            completion.push(
                AgentRole::Alternatives,
                search_turn("", &format!("rival {n}")),
            );
        }
        completion.push(
            AgentRole::Alternatives,
            tool_turn(SUBMIT_ALTERNATIVES_TOOL, three()),
        );

        let result = agent(completion.clone())
            .run("Sony WH-1000XM5", None)
            .await
            .unwrap();

        assert_eq!(result.searches.len(), 3);
        assert_eq!(result.alternatives.len(), 3);
        let requests = completion.requests_for(AgentRole::Alternatives);
        assert_eq!(requests.len(), 5);
        let reply = match &requests[4].messages.last().unwrap().content[0] {
            crate::domain::models::ContentBlock::ToolResult { content, .. } => content.clone(),
            other => panic!("expected tool result, got {other:?}"),
        };
        assert_eq!(reply, SEARCH_EXHAUSTED);
        let third = format!("{:?}", requests[3].messages.last().unwrap().content[0]);
        assert!(third.contains(SUBMIT_NUDGE));
    }
}
