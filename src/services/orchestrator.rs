//! Verdict synthesis: one forced `submit_verdict` call, no searching.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AgentProfile, AgentRole, CompletionRequest, Message, PipelineContext, ToolChoice, Verdict,
};
use crate::domain::ports::CompletionService;

use super::prompts::{self, Brief};
use super::tools::{submit_verdict_tool, SUBMIT_VERDICT_TOOL};

pub struct VerdictSynthesizer {
    completion: Arc<dyn CompletionService>,
    profile: AgentProfile,
}

impl VerdictSynthesizer {
    pub fn new(completion: Arc<dyn CompletionService>, profile: AgentProfile) -> Self {
        Self {
            completion,
            profile,
        }
    }

    /// Synthesize the chain's analyses into a verdict.
    ///
    /// A malformed submission is an error. No submission at all yields
    /// [`Verdict::fallback`].
    #[instrument(skip_all, fields(agent = "orchestrator"))]
    pub async fn synthesize(
        &self,
        brief: &Brief<'_>,
        context: &PipelineContext,
    ) -> DomainResult<Verdict> {
        let ownership = brief.owns.is_some();
        let response = self
            .completion
            .complete(CompletionRequest {
                agent: AgentRole::Orchestrator,
                model: self.profile.model.clone(),
                system: prompts::orchestrator_system(brief, context),
                messages: vec![Message::user_text(prompts::VERDICT_REQUEST)],
                tools: vec![submit_verdict_tool(ownership)],
                max_tokens: self.profile.max_tokens,
                tool_choice: Some(ToolChoice::Tool {
                    name: SUBMIT_VERDICT_TOOL.to_string(),
                }),
            })
            .await?;

        let Some(input) = response.tool_input(SUBMIT_VERDICT_TOOL) else {
            warn!(stop_reason = %response.stop_reason, "no verdict submitted, using fallback");
            return Ok(Verdict::fallback());
        };

        let verdict = Verdict::from_tool_input(input, ownership).map_err(|e| {
            DomainError::MalformedOutput {
                agent: AgentRole::Orchestrator,
                reason: e.to_string(),
            }
        })?;
        info!(decision = %verdict.decision, confidence = verdict.confidence, "verdict reached");
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{tool_turn, ScriptedCompletionService};
    use crate::domain::models::{CompletionResponse, Decision};
    use serde_json::json;

    fn synthesizer(completion: Arc<ScriptedCompletionService>) -> VerdictSynthesizer {
        VerdictSynthesizer::new(completion, AgentProfile::new("claude-sonnet-4-6", 512, 0))
    }

    fn context() -> PipelineContext {
        let mut context = PipelineContext::new();
        context.record(AgentRole::Advocate, "Great ANC.").unwrap();
        context.record(AgentRole::Skeptic, "Hinge lawsuit.").unwrap();
        context.record(AgentRole::Economist, "$398, low was $248.").unwrap();
        context
    }

    #[tokio::test]
    async fn test_forced_tool_call_parsed() {
        let completion = Arc::new(ScriptedCompletionService::new());
        completion.push(
            AgentRole::Orchestrator,
            tool_turn(
                SUBMIT_VERDICT_TOOL,
                json!({
                    "decision": "WAIT",
                    "confidence": 78,
                    "reasoning": "Price is $150 above the recent low.",
                    "alternative": "ignored for WAIT",
                    "bullets": ["ANC leads the class", "Hinge lawsuit pending", "Wait for $248"]
                }),
            ),
        );

        let verdict = synthesizer(completion.clone())
            .synthesize(&Brief::new("Sony WH-1000XM5", None), &context())
            .await
            .unwrap();

        assert_eq!(verdict.decision, Decision::Wait);
        assert_eq!(verdict.confidence, 78);
        assert_eq!(verdict.alternative, None);

        let request = &completion.requests_for(AgentRole::Orchestrator)[0];
        assert_eq!(
            request.tool_choice,
            Some(ToolChoice::Tool {
                name: SUBMIT_VERDICT_TOOL.to_string()
            })
        );
        assert_eq!(request.max_tokens, 512);
        assert!(request.system.contains("Hinge lawsuit."));
        assert!(request.system.contains("$398, low was $248."));
    }

    #[tokio::test]
    async fn test_missing_call_falls_back() {
        let completion = Arc::new(ScriptedCompletionService::new());
        completion.push(
            AgentRole::Orchestrator,
            CompletionResponse::end_turn("I think you should buy it."),
        );

        let verdict = synthesizer(completion)
            .synthesize(&Brief::new("Sony WH-1000XM5", None), &context())
            .await
            .unwrap();

        assert!(verdict.is_fallback());
        assert_eq!(verdict.decision, Decision::Skip);
    }

    #[tokio::test]
    async fn test_ownership_decision_needs_ownership() {
        let completion = Arc::new(ScriptedCompletionService::new());
        let input = json!({
            "decision": "YOU DON'T NEED IT",
            "confidence": 90,
            "reasoning": "Redundant.",
            "bullets": ["a", "b", "c"]
        });
        completion.push(AgentRole::Orchestrator, tool_turn(SUBMIT_VERDICT_TOOL, input.clone()));
        completion.push(AgentRole::Orchestrator, tool_turn(SUBMIT_VERDICT_TOOL, input));
        let synthesizer = synthesizer(completion);

        let err = synthesizer
            .synthesize(&Brief::new("Sony WH-1000XM5", None), &context())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::MalformedOutput {
                agent: AgentRole::Orchestrator,
                ..
            }
        ));

        let verdict = synthesizer
            .synthesize(&Brief::new("Sony WH-1000XM5", Some("Sony WH-1000XM4")), &context())
            .await
            .unwrap();
        assert_eq!(verdict.decision, Decision::YouDontNeedIt);
    }
}
