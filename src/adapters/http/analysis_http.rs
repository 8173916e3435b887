//! Analysis HTTP server: job submission and SSE progress streams.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, Method, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json,
    },
    routing::{get, post},
    Router,
};
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domain::errors::DomainError;
use crate::domain::models::{AnalysisEvent, JobsConfig, ServerConfig};
use crate::services::{AnalysisRequest, AnalysisService, JobStream};

/// Payload that ends every stream fed from a job queue.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Shared state for the analysis HTTP server.
pub struct AnalysisState {
    pub service: Arc<AnalysisService>,
    pub config: ServerConfig,
}

/// Analysis HTTP server.
pub struct AnalysisHttpServer {
    state: Arc<AnalysisState>,
    jobs: JobsConfig,
}

impl AnalysisHttpServer {
    pub fn new(service: Arc<AnalysisService>, config: ServerConfig, jobs: JobsConfig) -> Self {
        Self {
            state: Arc::new(AnalysisState { service, config }),
            jobs,
        }
    }

    /// Build the router with all endpoints.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/analyze", post(start_analysis))
            .route("/stream/{job_id}", get(stream_job))
            .route("/health", get(health_check))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&self.state.config.allowed_origins))
    }

    /// Serve until `shutdown` resolves. The unclaimed-job reaper runs for
    /// the lifetime of the server.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr =
            format!("{}:{}", self.state.config.host, self.state.config.port).parse()?;
        let router = self.router();
        let reaper = self.state.service.spawn_reaper(&self.jobs);

        tracing::info!(%addr, "analysis HTTP server listening");

        let listener = TcpListener::bind(addr).await?;
        let served = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await;
        reaper.abort();
        served?;
        Ok(())
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);
    if allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Error response structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub job_id: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub active_jobs: usize,
}

/// Start a job and return its id without waiting on any agent.
async fn start_analysis(
    State(state): State<Arc<AnalysisState>>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalyzeResponse>, (StatusCode, Json<ErrorResponse>)> {
    let request = request
        .normalized(state.config.max_product_chars)
        .map_err(|e| {
            let error = match e {
                DomainError::ValidationFailed(message) => message,
                other => other.to_string(),
            };
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error,
                    code: "INVALID_PRODUCT".to_string(),
                }),
            )
        })?;

    let job_id = state.service.start(request);
    Ok(Json(AnalyzeResponse {
        job_id: job_id.to_string(),
    }))
}

/// SSE stream of one job's events, ending with `[DONE]`.
async fn stream_job(
    State(state): State<Arc<AnalysisState>>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    let source = match state.service.registry().attach(&job_id) {
        Ok(stream) => StreamState::Attached(stream),
        Err(err) => {
            tracing::warn!(%job_id, error = %err, "stream request rejected");
            StreamState::Rejected(attach_error_message(&err))
        }
    };
    let keep_alive = Duration::from_secs(state.config.keep_alive_secs.max(1));

    (
        [("x-accel-buffering", "no")],
        Sse::new(job_event_stream(source)).keep_alive(KeepAlive::new().interval(keep_alive)),
    )
}

fn attach_error_message(error: &DomainError) -> String {
    match error {
        DomainError::JobNotFound(_) => "job not found".to_string(),
        DomainError::JobAlreadyAttached(_) => "job already has a consumer".to_string(),
        other => other.to_string(),
    }
}

enum StreamState {
    Attached(JobStream),
    Rejected(String),
    Finished,
}

fn job_event_stream(source: StreamState) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(source, |state| async move {
        match state {
            StreamState::Attached(mut job) => match job.next().await {
                Some(event) => Some((Ok(sse_event(&event)), StreamState::Attached(job))),
                None => Some((Ok(Event::default().data(DONE_SENTINEL)), StreamState::Finished)),
            },
            StreamState::Rejected(message) => Some((
                Ok(sse_event(&AnalysisEvent::error(message))),
                StreamState::Finished,
            )),
            StreamState::Finished => None,
        }
    })
}

fn sse_event(event: &AnalysisEvent) -> Event {
    match serde_json::to_string(event) {
        Ok(json) => Event::default().data(json),
        Err(err) => {
            tracing::error!(error = %err, kind = event.kind(), "failed to serialize event");
            Event::default().data(r#"{"type":"error","message":"event serialization failed"}"#)
        }
    }
}

/// Health check endpoint.
async fn health_check(State(state): State<Arc<AnalysisState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "shouldibuy".to_string(),
        active_jobs: state.service.registry().len(),
    })
}
