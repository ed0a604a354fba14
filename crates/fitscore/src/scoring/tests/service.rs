use std::sync::Arc;

use serde_json::Value;

use super::common::*;
use crate::broadcast::{score_channel, Subscriber};
use crate::quota::QuotaGate;
use crate::scoring::{MatchScorer, ScoringServiceError};
use crate::store::{DocumentStore, ScoreStore};

fn frames(receiver: &mut tokio::sync::mpsc::UnboundedReceiver<String>) -> Vec<Value> {
    let mut frames = Vec::new();
    while let Ok(raw) = receiver.try_recv() {
        frames.push(serde_json::from_str(&raw).expect("json frame"));
    }
    frames
}

#[tokio::test]
async fn score_publishes_partial_then_final_and_persists() {
    let assistant = Arc::new(FixedAssistant::returning(assessment(9.0)));
    let harness = harness(MatchScorer::new(quota(45)).with_assistant(assistant));
    let (subscriber, mut receiver) = Subscriber::channel();
    harness
        .broadcast
        .subscribe(&score_channel("cand-1", "post-1"), &subscriber);

    let result = harness
        .service
        .score("cand-1", "post-1")
        .await
        .expect("scored");

    let frames = frames(&mut receiver);
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0]["channel"], "score:cand-1:post-1");
    assert_eq!(frames[0]["data"]["phase"], "partial");
    assert_eq!(frames[0]["data"]["result"]["strategy"], "deterministic");
    assert_eq!(frames[1]["data"]["phase"], "final");
    assert_eq!(frames[1]["data"]["result"]["strategy"], "assisted");
    assert_eq!(frames[1]["data"]["result"]["overall"], result.overall);

    let stored = harness
        .scores
        .load("cand-1", "post-1")
        .expect("store reachable");
    assert_eq!(stored, Some(result));
}

#[tokio::test]
async fn unknown_documents_are_not_found() {
    let harness = harness(MatchScorer::new(Arc::new(QuotaGate::new(45))));

    let missing_candidate = harness.service.score("ghost", "post-1").await;
    assert!(matches!(
        missing_candidate,
        Err(ScoringServiceError::NotFound(what)) if what == "candidate ghost"
    ));

    let missing_target = harness.service.score("cand-1", "ghost").await;
    assert!(matches!(
        missing_target,
        Err(ScoringServiceError::NotFound(what)) if what == "target ghost"
    ));
    assert!(harness.scores.is_empty());
}

#[tokio::test]
async fn inline_documents_are_upserted_before_scoring() {
    let harness = harness(MatchScorer::new(quota(45)));
    let mut candidate = candidate();
    candidate.id = "cand-inline".to_string();
    let mut target = target();
    target.id = "post-inline".to_string();

    let result = harness
        .service
        .score_documents(candidate, target, None, None)
        .await
        .expect("scored");

    assert!(harness
        .documents
        .candidate("cand-inline")
        .expect("store reachable")
        .is_some());
    let again = harness
        .service
        .score("cand-inline", "post-inline")
        .await
        .expect("stored documents score");
    assert_eq!(again, result);
}

#[tokio::test]
async fn supplied_candidate_text_overrides_the_rendered_profile() {
    let harness = harness(MatchScorer::new(quota(45)));

    let rendered = harness
        .service
        .score_documents(candidate(), target(), None, None)
        .await
        .expect("scored");
    let supplied = harness
        .service
        .score_documents(
            candidate(),
            target(),
            Some("Prometheus Kubernetes Terraform cloud infrastructure experience".to_string()),
            None,
        )
        .await
        .expect("scored");

    assert!(
        supplied.breakdown.keyword_coverage.matched > rendered.breakdown.keyword_coverage.matched
    );
}
