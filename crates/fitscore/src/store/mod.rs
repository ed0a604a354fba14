//! Persistence boundaries. Durable storage lives outside this crate; the traits here are
//! what the scoring service and job orchestrator are wired against.

pub mod memory;

use crate::scoring::{CandidateDocument, ScoreResult, TargetDocument};

pub use memory::{
    InMemoryArtifactStore, InMemoryDocumentStore, InMemoryJobRepository, InMemoryScoreStore,
};

/// Read access to candidates and targets, plus the upserts the score endpoint needs.
pub trait DocumentStore: Send + Sync {
    fn candidate(&self, id: &str) -> Result<Option<CandidateDocument>, StoreError>;
    fn target(&self, id: &str) -> Result<Option<TargetDocument>, StoreError>;
    fn upsert_candidate(&self, candidate: CandidateDocument) -> Result<(), StoreError>;
    fn upsert_target(&self, target: TargetDocument) -> Result<(), StoreError>;
}

/// Latest score per `(candidate_id, target_id)` pair.
pub trait ScoreStore: Send + Sync {
    fn save(
        &self,
        candidate_id: &str,
        target_id: &str,
        result: &ScoreResult,
    ) -> Result<(), StoreError>;
    fn load(&self, candidate_id: &str, target_id: &str)
        -> Result<Option<ScoreResult>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
