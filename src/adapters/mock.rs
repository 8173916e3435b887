//! Scripted implementations of the service ports for tests and offline runs.

use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AgentRole, CompletionRequest, CompletionResponse, ContentBlock, SearchHit, StopReason,
};
use crate::domain::ports::{CompletionService, SearchService};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

static TOOL_USE_IDS: AtomicU64 = AtomicU64::new(1);

fn next_tool_use_id() -> String {
    format!("toolu_mock_{}", TOOL_USE_IDS.fetch_add(1, Ordering::Relaxed))
}

/// A `tool_use` turn: optional reasoning text followed by one search call.
pub fn search_turn(thought: &str, query: &str) -> CompletionResponse {
    let mut content = Vec::new();
    if !thought.is_empty() {
        content.push(ContentBlock::text(thought));
    }
    content.push(ContentBlock::tool_use(
        next_tool_use_id(),
        "search",
        json!({ "query": query }),
    ));
    CompletionResponse::new(StopReason::ToolUse, content)
}

/// A `tool_use` turn calling `tool` with `input`.
pub fn tool_turn(tool: &str, input: serde_json::Value) -> CompletionResponse {
    CompletionResponse::new(
        StopReason::ToolUse,
        vec![ContentBlock::tool_use(next_tool_use_id(), tool, input)],
    )
}

/// Completion service answering each role from its own queue of responses.
///
/// Every request is recorded. A role whose queue is empty gets a
/// `CompletionFailed` error.
#[derive(Default)]
pub struct ScriptedCompletionService {
    scripts: Mutex<HashMap<AgentRole, VecDeque<DomainResult<CompletionResponse>>>>,
    delays: Mutex<HashMap<AgentRole, Duration>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, role: AgentRole, response: CompletionResponse) {
        lock(&self.scripts)
            .entry(role)
            .or_default()
            .push_back(Ok(response));
    }

    pub fn push_error(&self, role: AgentRole, error: DomainError) {
        lock(&self.scripts)
            .entry(role)
            .or_default()
            .push_back(Err(error));
    }

    /// Sleep before answering every request from `role`.
    pub fn delay(&self, role: AgentRole, delay: Duration) {
        lock(&self.delays).insert(role, delay);
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        lock(&self.requests).clone()
    }

    pub fn requests_for(&self, role: AgentRole) -> Vec<CompletionRequest> {
        lock(&self.requests)
            .iter()
            .filter(|r| r.agent == role)
            .cloned()
            .collect()
    }

    /// Responses not yet consumed for `role`.
    pub fn remaining(&self, role: AgentRole) -> usize {
        lock(&self.scripts).get(&role).map_or(0, VecDeque::len)
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletionService {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> DomainResult<CompletionResponse> {
        let role = request.agent;
        let delay = lock(&self.delays).get(&role).copied();
        lock(&self.requests).push(request);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        lock(&self.scripts)
            .get_mut(&role)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(DomainError::CompletionFailed(format!(
                    "no scripted response left for {role}"
                )))
            })
    }
}

/// Search service returning the same hits for every query.
pub struct StaticSearchService {
    hits: Vec<SearchHit>,
    failure: Option<String>,
    queries: Mutex<Vec<String>>,
}

impl StaticSearchService {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            failure: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Service whose every search fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            hits: Vec::new(),
            failure: Some(message.into()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl SearchService for StaticSearchService {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn search(&self, query: &str) -> DomainResult<Vec<SearchHit>> {
        lock(&self.queries).push(query.to_string());
        match &self.failure {
            Some(message) => Err(DomainError::SearchFailed(message.clone())),
            None => Ok(self.hits.clone()),
        }
    }
}
