//! Advocate, Skeptic and Economist: free-text analysts on the tool loop.

use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AgentProfile, AgentResult, AgentRole, PipelineContext};

use super::event_bus::JobEmitter;
use super::prompts::{self, Brief};
use super::tool_loop::{LoopRequest, ToolLoop};
use super::tools::search_tool;

fn search_purpose(role: AgentRole) -> &'static str {
    match role {
        AgentRole::Skeptic => {
            "owner complaints, failure reports, durability problems and regrets about the product"
        }
        AgentRole::Economist => {
            "current prices, price history, sales and competing products with their prices"
        }
        _ => {
            "product reviews, awards, expert opinions, and specifications to gather information \
             about the product"
        }
    }
}

/// Runs one of the three chained analyst roles.
pub struct AnalystAgent {
    tool_loop: Arc<ToolLoop>,
}

impl AnalystAgent {
    pub fn new(tool_loop: Arc<ToolLoop>) -> Self {
        Self { tool_loop }
    }

    /// Run `role` against the analyses finished so far.
    ///
    /// `context` is a snapshot. Only the Skeptic and Economist read from it.
    pub async fn run(
        &self,
        role: AgentRole,
        profile: &AgentProfile,
        brief: &Brief<'_>,
        context: &PipelineContext,
        emit: Option<&JobEmitter>,
    ) -> DomainResult<AgentResult> {
        let budget = profile.search_budget;
        let system_prompt = match role {
            AgentRole::Advocate => prompts::advocate_system(brief, budget),
            AgentRole::Skeptic => prompts::skeptic_system(brief, budget, context),
            AgentRole::Economist => prompts::economist_system(brief, budget, context),
            other => {
                return Err(DomainError::ValidationFailed(format!(
                    "{other} is not an analyst role"
                )))
            }
        };

        let request = LoopRequest::new(
            role,
            profile.clone(),
            system_prompt,
            prompts::analysis_request(brief.product),
            vec![search_tool(search_purpose(role))],
        );
        let outcome = self.tool_loop.run(&request, emit).await?;
        tracing::debug!(agent = %role, termination = ?outcome.termination, "analyst done");
        Ok(outcome.result)
    }
}
