//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use shouldibuy::adapters::mock::{ScriptedCompletionService, StaticSearchService};
use shouldibuy::domain::models::{AnalysisEvent, Config, SearchHit};
use shouldibuy::services::{AnalysisPipeline, AnalysisService, JobRegistry, JobStream};

pub const PRODUCT: &str = "Sony WH-1000XM5";

/// Setup test logging.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn review_hits() -> Vec<SearchHit> {
    vec![
        SearchHit::new(
            "Sony WH-1000XM5 review",
            "https://example.com/xm5-review",
            "Best-in-class noise cancelling with 30 hour battery life.",
        ),
        SearchHit::new(
            "XM5 price tracker",
            "https://example.com/xm5-prices",
            "Lowest price in 90 days: $298.",
        ),
    ]
}

pub fn verdict_input(decision: &str) -> Value {
    json!({
        "decision": decision,
        "confidence": 74,
        "reasoning": "Excellent headphones, but the price drops every autumn.",
        "bullets": [
            "Class-leading noise cancelling",
            "Hinge no longer folds",
            "Usually $100 cheaper in November"
        ]
    })
}

pub fn alternatives_input() -> Value {
    json!({
        "alternatives": [
            {"name": "Bose QuietComfort Ultra", "price": "$429", "note": "Slightly better ANC."},
            {"name": "Sony WH-1000XM4", "price": "$248", "note": "Folds flat and costs less."},
            {"name": "Sennheiser Momentum 4", "price": "$299", "note": "60 hour battery."}
        ]
    })
}

pub fn pipeline(completion: Arc<ScriptedCompletionService>) -> AnalysisPipeline {
    AnalysisPipeline::new(
        completion,
        Arc::new(StaticSearchService::new(review_hits())),
        &Config::default(),
    )
}

pub fn service(completion: Arc<ScriptedCompletionService>) -> Arc<AnalysisService> {
    Arc::new(AnalysisService::new(
        Arc::new(pipeline(completion)),
        Arc::new(JobRegistry::new()),
    ))
}

pub async fn drain(mut stream: JobStream) -> Vec<AnalysisEvent> {
    let mut events = Vec::new();
    while let Some(event) = stream.next().await {
        events.push(event);
    }
    events
}
