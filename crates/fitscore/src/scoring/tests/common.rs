use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::broadcast::BroadcastRegistry;
use crate::quota::{ManualClock, QuotaGate};
use crate::scoring::{
    AssistError, AssistedAssessment, CandidateDocument, ContactInfo, ExperienceEntry,
    MatchScorer, ScoreInput, ScoringAssistant, ScoringService, TargetDocument,
};
use crate::store::{InMemoryDocumentStore, InMemoryScoreStore};

pub(super) fn candidate() -> CandidateDocument {
    CandidateDocument {
        id: "cand-1".to_string(),
        name: "Ada Lovelace".to_string(),
        contact: ContactInfo {
            email: Some("ada@example.com".to_string()),
            phone: None,
            location: Some("London".to_string()),
        },
        summary: "Platform engineer who builds reliable Rust and Python services, \
                  automates Kubernetes infrastructure, and mentors growing teams."
            .to_string(),
        experience: vec![ExperienceEntry {
            title: "Senior Platform Engineer".to_string(),
            organization: "Analytical Engines".to_string(),
            bullets: vec![
                "Cut deployment time by 40% by moving services onto Kubernetes".to_string(),
                "Led a team of five engineers through a Terraform migration".to_string(),
                "Maintained internal documentation for the observability stack".to_string(),
            ],
        }],
        skills: vec![
            "Rust".to_string(),
            "Python".to_string(),
            "Kubernetes".to_string(),
            "Terraform".to_string(),
        ],
    }
}

pub(super) fn target() -> TargetDocument {
    TargetDocument {
        id: "post-1".to_string(),
        title: "Platform Engineer".to_string(),
        company: "Initech".to_string(),
        description: "We need an engineer with Kubernetes, Terraform and Prometheus \
                      experience to run our cloud infrastructure."
            .to_string(),
    }
}

pub(super) fn input() -> ScoreInput {
    ScoreInput::from_documents(&candidate(), &target())
}

pub(super) fn quota(limit: u32) -> Arc<QuotaGate> {
    let today = NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date");
    Arc::new(QuotaGate::with_clock(limit, Arc::new(ManualClock::new(today))))
}

pub(super) fn assessment(points: f64) -> AssistedAssessment {
    AssistedAssessment {
        keyword_coverage: points,
        relevance: points,
        quantification: points,
        formatting: points,
        readability: points,
        suggestions: vec!["Mention Prometheus dashboards you built".to_string()],
    }
}

/// Assistant returning a fixed assessment and counting calls.
#[derive(Default)]
pub(super) struct FixedAssistant {
    pub(super) assessment: Option<AssistedAssessment>,
    pub(super) calls: AtomicUsize,
}

impl FixedAssistant {
    pub(super) fn returning(assessment: AssistedAssessment) -> Self {
        Self {
            assessment: Some(assessment),
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoringAssistant for FixedAssistant {
    async fn assess(&self, _input: &ScoreInput) -> Result<AssistedAssessment, AssistError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.assessment
            .clone()
            .ok_or_else(|| AssistError::Malformed("no assessment configured".to_string()))
    }
}

pub(super) struct FailingAssistant;

#[async_trait]
impl ScoringAssistant for FailingAssistant {
    async fn assess(&self, _input: &ScoreInput) -> Result<AssistedAssessment, AssistError> {
        Err(AssistError::Status(503))
    }
}

pub(super) struct Harness {
    pub(super) service: Arc<ScoringService>,
    pub(super) documents: InMemoryDocumentStore,
    pub(super) scores: InMemoryScoreStore,
    pub(super) broadcast: Arc<BroadcastRegistry>,
}

pub(super) fn harness(scorer: MatchScorer) -> Harness {
    let documents = InMemoryDocumentStore::with_documents([candidate()], [target()]);
    let scores = InMemoryScoreStore::default();
    let broadcast = Arc::new(BroadcastRegistry::new());
    let service = Arc::new(ScoringService::new(
        Arc::new(documents.clone()),
        Arc::new(scores.clone()),
        Arc::new(scorer),
        broadcast.clone(),
    ));
    Harness {
        service,
        documents,
        scores,
        broadcast,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}
