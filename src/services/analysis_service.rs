//! Job lifecycle: register, execute in the background, report failure.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{error, info, info_span, warn, Instrument};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AnalysisEvent, JobId, JobsConfig};

use super::event_bus::JobEmitter;
use super::job_registry::JobRegistry;
use super::pipeline::AnalysisPipeline;

/// What the caller wants analysed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub product: String,
    #[serde(default)]
    pub owns: Option<String>,
}

impl AnalysisRequest {
    pub fn new(product: impl Into<String>, owns: Option<String>) -> Self {
        Self {
            product: product.into(),
            owns,
        }
    }

    /// Trim both fields, drop a blank `owns`, and bound the product length.
    pub fn normalized(self, max_product_chars: usize) -> DomainResult<Self> {
        let product = self.product.trim().to_string();
        if product.is_empty() {
            return Err(DomainError::ValidationFailed(
                "product must not be empty".to_string(),
            ));
        }
        let chars = product.chars().count();
        if chars > max_product_chars {
            return Err(DomainError::ValidationFailed(format!(
                "product is {chars} characters, the limit is {max_product_chars}"
            )));
        }
        let owns = self
            .owns
            .map(|owns| owns.trim().to_string())
            .filter(|owns| !owns.is_empty());
        Ok(Self { product, owns })
    }
}

/// Starts analysis jobs and owns the registry they live in.
pub struct AnalysisService {
    pipeline: Arc<AnalysisPipeline>,
    registry: Arc<JobRegistry>,
}

impl AnalysisService {
    pub fn new(pipeline: Arc<AnalysisPipeline>, registry: Arc<JobRegistry>) -> Self {
        Self { pipeline, registry }
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    /// Register a job and start its pipeline without waiting on any agent.
    pub fn start(&self, request: AnalysisRequest) -> JobId {
        let (job_id, emitter) = self.registry.create();
        let span = info_span!("analysis_job", %job_id);
        info!(parent: &span, product = %request.product, "job accepted");
        tokio::spawn(run_job(Arc::clone(&self.pipeline), request, emitter).instrument(span));
        job_id
    }

    /// Periodically drop jobs nobody attached to.
    pub fn spawn_reaper(&self, config: &JobsConfig) -> JoinHandle<()> {
        let registry = Arc::clone(&self.registry);
        let ttl = Duration::from_secs(config.unclaimed_ttl_secs);
        let period = Duration::from_secs(config.reap_interval_secs.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let reaped = registry.reap_unclaimed(ttl);
                if reaped > 0 {
                    warn!(reaped, "dropped jobs with no consumer");
                }
            }
        })
    }
}

/// Execute one job. Any failure, including a panic inside the pipeline,
/// becomes a single `error` event. Dropping the emitters closes the queue.
async fn run_job(pipeline: Arc<AnalysisPipeline>, request: AnalysisRequest, emitter: JobEmitter) {
    let pipeline_emitter = emitter.clone();
    let outcome = tokio::spawn(
        async move {
            pipeline
                .execute(
                    &request.product,
                    request.owns.as_deref(),
                    Some(&pipeline_emitter),
                )
                .await
        }
        .in_current_span(),
    )
    .await
    .map_err(DomainError::from)
    .and_then(|result| result);

    match outcome {
        Ok(report) => info!(
            decision = %report.verdict.decision,
            confidence = report.verdict.confidence,
            "job finished"
        ),
        Err(err) => {
            error!(error = %err, "job failed");
            emitter.emit(AnalysisEvent::error(err.to_string()));
        }
    }
}
