//! Candidate-to-target match scoring.
//!
//! [`MatchScorer`] picks between the assisted strategy (an external [`ScoringAssistant`],
//! gated by the daily [`QuotaGate`]) and the local deterministic heuristics. Scoring never
//! fails: every assisted failure falls back to the deterministic breakdown.

pub mod assistant;
pub mod breakdown;
pub mod deterministic;
pub mod domain;
pub mod router;
pub mod service;
pub mod suggestions;
pub mod tailor;

#[cfg(test)]
mod tests;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

use lru::LruCache;
use tracing::{debug, warn};

pub use assistant::{AssistError, AssistedAssessment, HttpScoringAssistant, ScoringAssistant};
pub use breakdown::{
    Formatting, FormattingIssue, KeywordCoverage, Quantification, Readability, ReadabilityBand,
    Relevance, RelevanceSignal, ScoreBreakdown, ScoreResult, ScoringStrategy,
};
pub use domain::{
    CandidateDocument, ContactInfo, EmbeddingPair, ExperienceEntry, ScoreInput, TargetDocument,
};
pub use router::scoring_router;
pub use service::{ScorePhase, ScoreUpdate, ScoringService, ScoringServiceError};
pub use tailor::TailoredDraft;

use crate::quota::QuotaGate;

const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Strategy-selecting scorer shared across request handlers and batch jobs.
pub struct MatchScorer {
    assistant: Option<Arc<dyn ScoringAssistant>>,
    quota: Arc<QuotaGate>,
    cache: Mutex<LruCache<u64, AssistedAssessment>>,
}

impl MatchScorer {
    /// Deterministic-only scorer. Attach an assistant with [`MatchScorer::with_assistant`].
    pub fn new(quota: Arc<QuotaGate>) -> Self {
        Self {
            assistant: None,
            quota,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            )),
        }
    }

    pub fn with_assistant(mut self, assistant: Arc<dyn ScoringAssistant>) -> Self {
        self.assistant = Some(assistant);
        self
    }

    pub async fn score(&self, input: &ScoreInput) -> ScoreResult {
        self.score_with_baseline(input, deterministic::breakdown(input))
            .await
    }

    /// Finish scoring from an already computed deterministic breakdown. Lets callers
    /// publish the cheap local result before the assisted call completes.
    pub async fn score_with_baseline(
        &self,
        input: &ScoreInput,
        baseline: ScoreBreakdown,
    ) -> ScoreResult {
        match self.assisted_assessment(input).await {
            Some(assessment) => {
                let breakdown = assessment.apply(baseline);
                let mut suggestions = assessment.cleaned_suggestions();
                if suggestions.is_empty() {
                    suggestions = suggestions::derive(&breakdown);
                }
                ScoreResult::new(breakdown, suggestions, ScoringStrategy::Assisted)
            }
            None => deterministic::from_breakdown(baseline),
        }
    }

    async fn assisted_assessment(&self, input: &ScoreInput) -> Option<AssistedAssessment> {
        let assistant = self.assistant.as_ref()?;
        let key = cache_key(input);

        let cached = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        if let Some(hit) = cached {
            debug!("assisted assessment served from cache");
            return Some(hit);
        }

        // Reserve quota right before the call goes out; cache hits above never count.
        if !self.quota.try_acquire() {
            debug!(
                limit = self.quota.limit(),
                "assist quota exhausted; using deterministic strategy"
            );
            return None;
        }

        match assistant.assess(input).await {
            Ok(assessment) => {
                self.cache
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .put(key, assessment.clone());
                Some(assessment)
            }
            Err(err) => {
                warn!(error = %err, "assisted scoring failed; using deterministic strategy");
                None
            }
        }
    }
}

fn cache_key(input: &ScoreInput) -> u64 {
    let mut hasher = DefaultHasher::new();
    input.candidate_text.hash(&mut hasher);
    input.target_text.hash(&mut hasher);
    input.candidate.hash(&mut hasher);
    hasher.finish()
}
