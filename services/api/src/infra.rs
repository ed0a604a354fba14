use fitscore::broadcast::BroadcastRegistry;
use fitscore::config::{AppConfig, JobConfig};
use fitscore::error::AppError;
use fitscore::jobs::{BatchScoreOperation, JobKind, JobOrchestrator, TailorOperation};
use fitscore::quota::QuotaGate;
use fitscore::scoring::{
    CandidateDocument, HttpScoringAssistant, MatchScorer, ScoringService, TargetDocument,
};
use fitscore::store::{
    InMemoryArtifactStore, InMemoryDocumentStore, InMemoryJobRepository, InMemoryScoreStore,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Documents preloaded into the in-memory store at startup.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SeedDocuments {
    #[serde(default)]
    pub(crate) candidates: Vec<CandidateDocument>,
    #[serde(default)]
    pub(crate) targets: Vec<TargetDocument>,
}

impl SeedDocuments {
    pub(crate) fn into_store(self) -> InMemoryDocumentStore {
        InMemoryDocumentStore::with_documents(self.candidates, self.targets)
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Long-lived collaborators shared by every route, wired once at startup.
pub(crate) struct Services {
    pub(crate) scoring: Arc<ScoringService>,
    pub(crate) orchestrator: Arc<JobOrchestrator>,
    pub(crate) broadcast: Arc<BroadcastRegistry>,
    pub(crate) artifacts: InMemoryArtifactStore,
}

pub(crate) fn match_scorer(config: &AppConfig) -> Result<MatchScorer, AppError> {
    let quota = Arc::new(QuotaGate::new(config.quota.daily_limit));
    let scorer = MatchScorer::new(quota);
    match &config.assistant {
        Some(assistant) => {
            info!(
                endpoint = %assistant.endpoint,
                model = %assistant.model,
                daily_limit = config.quota.daily_limit,
                "assisted scoring enabled"
            );
            let client = HttpScoringAssistant::new(assistant.clone())?;
            Ok(scorer.with_assistant(Arc::new(client)))
        }
        None => {
            info!("no assistant configured; scoring deterministically");
            Ok(scorer)
        }
    }
}

pub(crate) fn build_services(
    scorer: MatchScorer,
    documents: InMemoryDocumentStore,
    jobs: JobConfig,
) -> Services {
    let documents = Arc::new(documents);
    let broadcast = Arc::new(BroadcastRegistry::new());
    let artifacts = InMemoryArtifactStore::default();

    let scoring = Arc::new(ScoringService::new(
        documents.clone(),
        Arc::new(InMemoryScoreStore::default()),
        Arc::new(scorer),
        broadcast.clone(),
    ));
    let orchestrator = JobOrchestrator::new(
        Arc::new(InMemoryJobRepository::default()),
        Arc::new(artifacts.clone()),
        broadcast.clone(),
        jobs,
    )
    .with_operation(
        JobKind::BatchScore,
        Arc::new(BatchScoreOperation::new(scoring.clone())),
    )
    .with_operation(JobKind::BatchTailor, Arc::new(TailorOperation::new(documents)));

    Services {
        scoring,
        orchestrator: Arc::new(orchestrator),
        broadcast,
        artifacts,
    }
}
