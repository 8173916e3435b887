//! Dependency-ordered execution of the five roles for one job.
//!
//! Alternatives runs on its own task while Advocate, Skeptic and Economist
//! run in sequence, each reading a snapshot of the analyses before it. The
//! Orchestrator runs once the chain has finished and the Alternatives task
//! has joined.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, Instrument};

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    AgentResult, AgentRole, AgentsConfig, AlternativesResult, AnalysisEvent, Config,
    PipelineContext, Verdict,
};
use crate::domain::ports::{CompletionService, SearchService};

use super::alternatives::AlternativesAgent;
use super::analysts::AnalystAgent;
use super::event_bus::JobEmitter;
use super::orchestrator::VerdictSynthesizer;
use super::prompts::Brief;
use super::tool_loop::ToolLoop;

/// Everything one pipeline execution produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub advocate: AgentResult,
    pub skeptic: AgentResult,
    pub economist: AgentResult,
    pub alternatives: AlternativesResult,
    pub verdict: Verdict,
}

/// Aborts the wrapped task when dropped, so no branch outlives its job.
struct ScopedTask<T>(JoinHandle<T>);

impl<T> Drop for ScopedTask<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

struct Chain {
    advocate: AgentResult,
    skeptic: AgentResult,
    economist: AgentResult,
    context: PipelineContext,
}

pub struct AnalysisPipeline {
    analysts: AnalystAgent,
    alternatives: Arc<AlternativesAgent>,
    synthesizer: VerdictSynthesizer,
    agents: AgentsConfig,
}

impl AnalysisPipeline {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        search: Arc<dyn SearchService>,
        config: &Config,
    ) -> Self {
        let tool_loop = Arc::new(ToolLoop::new(
            Arc::clone(&completion),
            search,
            config.search.max_snippet_chars,
            config.agents.max_turns,
        ));
        Self {
            analysts: AnalystAgent::new(Arc::clone(&tool_loop)),
            alternatives: Arc::new(AlternativesAgent::new(
                tool_loop,
                config.agents.alternatives.clone(),
            )),
            synthesizer: VerdictSynthesizer::new(completion, config.agents.orchestrator.clone()),
            agents: config.agents.clone(),
        }
    }

    /// Run every role for `product` and return their results.
    ///
    /// With an emitter, the job's last two events are `verdict` then `done`.
    /// Any error aborts the remaining steps; turning it into an `error`
    /// event is the caller's job.
    #[instrument(skip_all, fields(
        product = %product,
        owns = owns.is_some(),
        job_id = emit.map(|e| tracing::field::display(e.job_id()))
    ))]
    pub async fn execute(
        &self,
        product: &str,
        owns: Option<&str>,
        emit: Option<&JobEmitter>,
    ) -> DomainResult<PipelineReport> {
        let brief = Brief::new(product, owns);

        let mut branch = {
            let agent = Arc::clone(&self.alternatives);
            let product = product.to_string();
            let emit = emit.cloned();
            ScopedTask(tokio::spawn(
                async move { agent.run(&product, emit.as_ref()).await }.in_current_span(),
            ))
        };

        let chain = match self.run_chain(&brief, emit).await {
            Ok(chain) => chain,
            Err(err) => {
                branch.0.abort();
                match (&mut branch.0).await {
                    Ok(Ok(result)) => debug!(
                        alternatives = result.alternatives.len(),
                        "alternatives result discarded after chain failure"
                    ),
                    Ok(Err(branch_err)) => debug!(
                        error = %branch_err,
                        "alternatives also failed after chain failure"
                    ),
                    Err(join_err) if join_err.is_cancelled() => {
                        debug!("alternatives aborted after chain failure");
                    }
                    Err(join_err) => debug!(
                        error = %join_err,
                        "alternatives task panicked after chain failure"
                    ),
                }
                return Err(err);
            }
        };

        let alternatives = (&mut branch.0).await??;
        info!(
            alternatives = alternatives.alternatives.len(),
            "alternatives joined"
        );

        let verdict = self.synthesizer.synthesize(&brief, &chain.context).await?;

        if let Some(emitter) = emit {
            emitter.emit(AnalysisEvent::Verdict {
                data: verdict.clone(),
            });
            emitter.emit(AnalysisEvent::Done);
        }

        Ok(PipelineReport {
            advocate: chain.advocate,
            skeptic: chain.skeptic,
            economist: chain.economist,
            alternatives,
            verdict,
        })
    }

    async fn run_chain(&self, brief: &Brief<'_>, emit: Option<&JobEmitter>) -> DomainResult<Chain> {
        let mut context = PipelineContext::new();

        let advocate = self.run_analyst(AgentRole::Advocate, brief, &context, emit).await?;
        context.record(AgentRole::Advocate, advocate.analysis.clone())?;

        let skeptic = self.run_analyst(AgentRole::Skeptic, brief, &context, emit).await?;
        context.record(AgentRole::Skeptic, skeptic.analysis.clone())?;

        let economist = self.run_analyst(AgentRole::Economist, brief, &context, emit).await?;
        context.record(AgentRole::Economist, economist.analysis.clone())?;

        Ok(Chain {
            advocate,
            skeptic,
            economist,
            context,
        })
    }

    async fn run_analyst(
        &self,
        role: AgentRole,
        brief: &Brief<'_>,
        context: &PipelineContext,
        emit: Option<&JobEmitter>,
    ) -> DomainResult<AgentResult> {
        let snapshot = context.snapshot();
        self.analysts
            .run(role, self.agents.profile(role), brief, &snapshot, emit)
            .await
    }
}
