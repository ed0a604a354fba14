use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::breakdown::ScoreResult;
use super::deterministic;
use super::domain::{CandidateDocument, EmbeddingPair, ScoreInput, TargetDocument};
use super::MatchScorer;
use crate::broadcast::{score_channel, BroadcastRegistry};
use crate::store::{DocumentStore, ScoreStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorePhase {
    /// Deterministic baseline, available before the assisted call returns.
    Partial,
    Final,
}

/// Payload published on `score:{candidate}:{target}`.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreUpdate<'a> {
    pub phase: ScorePhase,
    pub candidate_id: &'a str,
    pub target_id: &'a str,
    pub result: &'a ScoreResult,
}

/// Entry point composing document lookup, scoring, broadcast and persistence.
pub struct ScoringService {
    documents: Arc<dyn DocumentStore>,
    scores: Arc<dyn ScoreStore>,
    scorer: Arc<MatchScorer>,
    broadcast: Arc<BroadcastRegistry>,
}

impl ScoringService {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        scores: Arc<dyn ScoreStore>,
        scorer: Arc<MatchScorer>,
        broadcast: Arc<BroadcastRegistry>,
    ) -> Self {
        Self {
            documents,
            scores,
            scorer,
            broadcast,
        }
    }

    pub fn documents(&self) -> &Arc<dyn DocumentStore> {
        &self.documents
    }

    /// Score two stored documents against each other.
    pub async fn score(
        &self,
        candidate_id: &str,
        target_id: &str,
    ) -> Result<ScoreResult, ScoringServiceError> {
        let candidate = self
            .documents
            .candidate(candidate_id)?
            .ok_or_else(|| ScoringServiceError::NotFound(format!("candidate {candidate_id}")))?;
        let target = self
            .documents
            .target(target_id)?
            .ok_or_else(|| ScoringServiceError::NotFound(format!("target {target_id}")))?;

        let input = ScoreInput::from_documents(&candidate, &target);
        Ok(self.run(candidate_id, target_id, &input).await)
    }

    /// Score documents supplied inline, upserting them first so later lookups by id work.
    pub async fn score_documents(
        &self,
        candidate: CandidateDocument,
        target: TargetDocument,
        candidate_text: Option<String>,
        embeddings: Option<EmbeddingPair>,
    ) -> Result<ScoreResult, ScoringServiceError> {
        let text = candidate_text
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| candidate.plain_text());
        let mut input = ScoreInput::new(text, candidate.clone(), target.text());
        if let Some(embeddings) = embeddings {
            input = input.with_embeddings(embeddings);
        }

        let candidate_id = candidate.id.clone();
        let target_id = target.id.clone();
        self.documents.upsert_candidate(candidate)?;
        self.documents.upsert_target(target)?;

        Ok(self.run(&candidate_id, &target_id, &input).await)
    }

    /// Score already resolved documents without touching the document store.
    pub async fn score_pair(
        &self,
        candidate: &CandidateDocument,
        target: &TargetDocument,
    ) -> ScoreResult {
        let input = ScoreInput::from_documents(candidate, target);
        self.run(&candidate.id, &target.id, &input).await
    }

    async fn run(&self, candidate_id: &str, target_id: &str, input: &ScoreInput) -> ScoreResult {
        let channel = score_channel(candidate_id, target_id);

        let baseline = deterministic::breakdown(input);
        let partial = deterministic::from_breakdown(baseline.clone());
        self.publish(&channel, ScorePhase::Partial, candidate_id, target_id, &partial);

        let result = self.scorer.score_with_baseline(input, baseline).await;
        self.publish(&channel, ScorePhase::Final, candidate_id, target_id, &result);

        if let Err(err) = self.scores.save(candidate_id, target_id, &result) {
            warn!(candidate_id, target_id, error = %err, "failed to persist score");
        }

        info!(
            candidate_id,
            target_id,
            overall = result.overall,
            strategy = ?result.strategy,
            "scored match"
        );
        result
    }

    fn publish(
        &self,
        channel: &str,
        phase: ScorePhase,
        candidate_id: &str,
        target_id: &str,
        result: &ScoreResult,
    ) {
        self.broadcast.publish(
            channel,
            &ScoreUpdate {
                phase,
                candidate_id,
                target_id,
                result,
            },
        );
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScoringServiceError {
    #[error("{0} not found")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
