mod common;

use std::sync::Arc;
use std::time::Duration;

use shouldibuy::adapters::mock::{search_turn, tool_turn, ScriptedCompletionService};
use shouldibuy::domain::models::{
    AgentRole, AnalysisEvent, CompletionResponse, Decision, JobId, StepEvent,
};
use shouldibuy::domain::DomainError;
use shouldibuy::services::{job_channel, AnalysisRequest};

use common::{alternatives_input, drain, pipeline, service, verdict_input, PRODUCT};

fn position(events: &[AnalysisEvent], pred: impl Fn(&AnalysisEvent) -> bool) -> usize {
    events
        .iter()
        .position(pred)
        .unwrap_or_else(|| panic!("event not found in {events:?}"))
}

fn happy_path() -> Arc<ScriptedCompletionService> {
    let completion = Arc::new(ScriptedCompletionService::new());
    completion.push(
        AgentRole::Advocate,
        search_turn("Checking reviews first.", "Sony WH-1000XM5 review 2026"),
    );
    completion.push(
        AgentRole::Advocate,
        CompletionResponse::end_turn("Best noise cancelling in its class."),
    );
    completion.push(
        AgentRole::Skeptic,
        search_turn("", "Sony WH-1000XM5 hinge problems"),
    );
    completion.push(
        AgentRole::Skeptic,
        CompletionResponse::end_turn("The hinge no longer folds."),
    );
    completion.push(
        AgentRole::Economist,
        CompletionResponse::end_turn("Wait for the autumn sale."),
    );
    completion.push(
        AgentRole::Alternatives,
        tool_turn("submit_alternatives", alternatives_input()),
    );
    completion.push(
        AgentRole::Orchestrator,
        tool_turn("submit_verdict", verdict_input("WAIT")),
    );
    completion
}

#[tokio::test]
async fn test_full_run_event_order() {
    common::setup_test_logging();
    let (emitter, mut rx) = job_channel(JobId::new());

    let report = pipeline(happy_path())
        .execute(PRODUCT, None, Some(&emitter))
        .await
        .unwrap();
    drop(emitter);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    let advocate_done = position(&events, |e| {
        matches!(e, AnalysisEvent::Analysis { agent: AgentRole::Advocate, .. })
    });
    let skeptic_first = position(&events, |e| e.agent() == Some(AgentRole::Skeptic));
    let skeptic_done = position(&events, |e| {
        matches!(e, AnalysisEvent::Analysis { agent: AgentRole::Skeptic, .. })
    });
    let economist_first = position(&events, |e| e.agent() == Some(AgentRole::Economist));
    assert!(advocate_done < skeptic_first);
    assert!(skeptic_done < economist_first);

    let advocate_steps: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            AnalysisEvent::Step {
                agent: AgentRole::Advocate,
                step,
            } => Some(step.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        advocate_steps,
        vec![
            StepEvent::Think {
                text: "Checking reviews first.".to_string()
            },
            StepEvent::Search {
                query: "Sony WH-1000XM5 review 2026".to_string()
            },
        ]
    );

    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, AnalysisEvent::Alternatives { .. }))
            .count(),
        1
    );

    let n = events.len();
    assert!(matches!(
        &events[n - 2],
        AnalysisEvent::Verdict { data } if data.decision == Decision::Wait
    ));
    assert_eq!(events[n - 1], AnalysisEvent::Done);

    assert_eq!(report.advocate.searches.len(), 1);
    assert_eq!(report.skeptic.searches.len(), 1);
    assert!(report.economist.searches.is_empty());
    assert_eq!(report.alternatives.alternatives.len(), 3);
    assert_eq!(report.verdict.bullets.len(), 3);
}

#[tokio::test]
async fn test_context_threads_through_chain() {
    let completion = happy_path();
    pipeline(completion.clone())
        .execute(PRODUCT, None, None)
        .await
        .unwrap();

    let advocate_text = "---\nBest noise cancelling in its class.\n---";
    let skeptic_text = "---\nThe hinge no longer folds.\n---";
    let economist_text = "---\nWait for the autumn sale.\n---";

    let skeptic = &completion.requests_for(AgentRole::Skeptic)[0];
    assert!(skeptic.system.contains(advocate_text));

    let economist = &completion.requests_for(AgentRole::Economist)[0];
    assert!(economist.system.contains(advocate_text));
    assert!(economist.system.contains(skeptic_text));

    let orchestrator = &completion.requests_for(AgentRole::Orchestrator)[0];
    for text in [advocate_text, skeptic_text, economist_text] {
        assert!(orchestrator.system.contains(text), "missing {text}");
    }
    assert!(orchestrator.tools.iter().all(|t| t.name == "submit_verdict"));

    let alternatives = &completion.requests_for(AgentRole::Alternatives)[0];
    assert!(!alternatives.system.contains("Best noise cancelling"));
}

#[tokio::test]
async fn test_alternatives_streams_only_its_final_list() {
    let completion = Arc::new(ScriptedCompletionService::new());
    for role in [AgentRole::Advocate, AgentRole::Skeptic, AgentRole::Economist] {
        completion.push(role, CompletionResponse::end_turn(format!("{role} notes")));
    }
    for n in 1..=3 {
        completion.push(
            AgentRole::Alternatives,
            search_turn("Looking for rivals.", &format!("xm5 alternatives {n}")),
        );
    }
    completion.push(
        AgentRole::Alternatives,
        tool_turn("submit_alternatives", alternatives_input()),
    );
    completion.push(
        AgentRole::Orchestrator,
        tool_turn("submit_verdict", verdict_input("BUY")),
    );
    let (emitter, mut rx) = job_channel(JobId::new());

    let report = pipeline(completion)
        .execute(PRODUCT, None, Some(&emitter))
        .await
        .unwrap();
    drop(emitter);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    assert_eq!(report.alternatives.searches.len(), 3);
    assert!(
        !events.iter().any(|e| matches!(
            e,
            AnalysisEvent::Step { agent: AgentRole::Alternatives, .. }
                | AnalysisEvent::WritingStart { agent: AgentRole::Alternatives }
        )),
        "alternatives leaked progress events: {events:?}"
    );
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, AnalysisEvent::Alternatives { .. }))
            .count(),
        1
    );
}

#[tokio::test]
async fn test_ownership_unlocks_you_dont_need_it() {
    let fresh = Arc::new(ScriptedCompletionService::new());
    for role in [AgentRole::Advocate, AgentRole::Skeptic, AgentRole::Economist] {
        fresh.push(role, CompletionResponse::end_turn(format!("{role} notes")));
    }
    fresh.push(AgentRole::Alternatives, CompletionResponse::end_turn(""));
    fresh.push(
        AgentRole::Orchestrator,
        tool_turn("submit_verdict", verdict_input("YOU DON'T NEED IT")),
    );

    let report = pipeline(fresh.clone())
        .execute(PRODUCT, Some("Sony WH-1000XM4"), None)
        .await
        .unwrap();
    assert_eq!(report.verdict.decision, Decision::YouDontNeedIt);

    let orchestrator = &fresh.requests_for(AgentRole::Orchestrator)[0];
    let schema = orchestrator.tools[0].input_schema.to_string();
    assert!(schema.contains("YOU DON'T NEED IT"));
    assert!(orchestrator.system.contains("Sony WH-1000XM4"));
}

#[tokio::test]
async fn test_missing_verdict_call_uses_fallback() {
    let fresh = Arc::new(ScriptedCompletionService::new());
    for role in [AgentRole::Advocate, AgentRole::Skeptic, AgentRole::Economist] {
        fresh.push(role, CompletionResponse::end_turn("notes"));
    }
    fresh.push(AgentRole::Alternatives, CompletionResponse::end_turn(""));
    fresh.push(
        AgentRole::Orchestrator,
        CompletionResponse::end_turn("I think you should buy it."),
    );

    let report = pipeline(fresh).execute(PRODUCT, None, None).await.unwrap();
    assert!(report.verdict.is_fallback());
    assert_eq!(report.verdict.decision, Decision::Skip);
    assert!(report.alternatives.alternatives.is_empty());
}

#[tokio::test]
async fn test_hard_failure_emits_single_error_and_closes() {
    let completion = Arc::new(ScriptedCompletionService::new());
    completion.push(AgentRole::Advocate, CompletionResponse::end_turn("pro"));
    completion.push(AgentRole::Skeptic, CompletionResponse::end_turn("con"));
    completion.push_error(
        AgentRole::Economist,
        DomainError::CompletionFailed("upstream overloaded".to_string()),
    );
    // Slow Alternatives branch must not keep the job alive.
    completion.delay(AgentRole::Alternatives, Duration::from_secs(30));
    completion.push(AgentRole::Alternatives, CompletionResponse::end_turn(""));

    let service = service(completion.clone());
    let job_id = service.start(AnalysisRequest::new(PRODUCT, None));
    let stream = service.registry().attach(&job_id.to_string()).unwrap();

    let events = tokio::time::timeout(Duration::from_secs(5), drain(stream))
        .await
        .expect("job should end promptly after a hard failure");

    let errors: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, AnalysisEvent::Error { .. }))
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        events.last(),
        Some(AnalysisEvent::Error { message }) if message.contains("upstream overloaded")
    ));
    assert!(!events
        .iter()
        .any(|e| matches!(e, AnalysisEvent::Verdict { .. } | AnalysisEvent::Done)));
    assert!(completion.requests_for(AgentRole::Orchestrator).is_empty());
    assert!(service.registry().is_empty());
}

#[tokio::test]
async fn test_search_budget_is_enforced() {
    let completion = Arc::new(ScriptedCompletionService::new());
    // Default skeptic budget is 7; ask for 9 searches.
    for i in 0..9 {
        completion.push(AgentRole::Skeptic, search_turn("", &format!("query {i}")));
    }
    completion.push(AgentRole::Skeptic, CompletionResponse::end_turn("con"));
    completion.push(AgentRole::Advocate, CompletionResponse::end_turn("pro"));
    completion.push(AgentRole::Economist, CompletionResponse::end_turn("price"));
    completion.push(AgentRole::Alternatives, CompletionResponse::end_turn(""));
    completion.push(
        AgentRole::Orchestrator,
        tool_turn("submit_verdict", verdict_input("BUY")),
    );
    let (emitter, mut rx) = job_channel(JobId::new());

    let report = pipeline(completion)
        .execute(PRODUCT, None, Some(&emitter))
        .await
        .unwrap();
    drop(emitter);

    assert_eq!(report.skeptic.searches.len(), 7);
    let mut writing_starts = 0;
    while let Some(event) = rx.recv().await {
        if matches!(event, AnalysisEvent::WritingStart { agent: AgentRole::Skeptic }) {
            writing_starts += 1;
        }
    }
    assert_eq!(writing_starts, 1);
}
