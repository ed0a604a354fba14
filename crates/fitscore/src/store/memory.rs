//! Process-local stores backing the service binary, demos and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde_json::Value;

use super::{DocumentStore, ScoreStore, StoreError};
use crate::jobs::{ArtifactRef, ArtifactStore, Job, JobId, JobRepository};
use crate::scoring::{CandidateDocument, ScoreResult, TargetDocument};

fn poisoned(store: &str) -> StoreError {
    StoreError::Unavailable(format!("{store} lock poisoned"))
}

#[derive(Default, Clone)]
pub struct InMemoryDocumentStore {
    candidates: Arc<RwLock<HashMap<String, CandidateDocument>>>,
    targets: Arc<RwLock<HashMap<String, TargetDocument>>>,
}

impl InMemoryDocumentStore {
    pub fn with_documents(
        candidates: impl IntoIterator<Item = CandidateDocument>,
        targets: impl IntoIterator<Item = TargetDocument>,
    ) -> Self {
        let store = Self::default();
        if let Ok(mut guard) = store.candidates.write() {
            guard.extend(candidates.into_iter().map(|doc| (doc.id.clone(), doc)));
        }
        if let Ok(mut guard) = store.targets.write() {
            guard.extend(targets.into_iter().map(|doc| (doc.id.clone(), doc)));
        }
        store
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn candidate(&self, id: &str) -> Result<Option<CandidateDocument>, StoreError> {
        let guard = self.candidates.read().map_err(|_| poisoned("candidate"))?;
        Ok(guard.get(id).cloned())
    }

    fn target(&self, id: &str) -> Result<Option<TargetDocument>, StoreError> {
        let guard = self.targets.read().map_err(|_| poisoned("target"))?;
        Ok(guard.get(id).cloned())
    }

    fn upsert_candidate(&self, candidate: CandidateDocument) -> Result<(), StoreError> {
        let mut guard = self.candidates.write().map_err(|_| poisoned("candidate"))?;
        guard.insert(candidate.id.clone(), candidate);
        Ok(())
    }

    fn upsert_target(&self, target: TargetDocument) -> Result<(), StoreError> {
        let mut guard = self.targets.write().map_err(|_| poisoned("target"))?;
        guard.insert(target.id.clone(), target);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryScoreStore {
    scores: Arc<RwLock<HashMap<(String, String), ScoreResult>>>,
}

impl InMemoryScoreStore {
    pub fn len(&self) -> usize {
        self.scores.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ScoreStore for InMemoryScoreStore {
    fn save(
        &self,
        candidate_id: &str,
        target_id: &str,
        result: &ScoreResult,
    ) -> Result<(), StoreError> {
        let mut guard = self.scores.write().map_err(|_| poisoned("score"))?;
        guard.insert(
            (candidate_id.to_string(), target_id.to_string()),
            result.clone(),
        );
        Ok(())
    }

    fn load(
        &self,
        candidate_id: &str,
        target_id: &str,
    ) -> Result<Option<ScoreResult>, StoreError> {
        let guard = self.scores.read().map_err(|_| poisoned("score"))?;
        Ok(guard
            .get(&(candidate_id.to_string(), target_id.to_string()))
            .cloned())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryJobRepository {
    jobs: Arc<RwLock<HashMap<JobId, Job>>>,
}

impl JobRepository for InMemoryJobRepository {
    fn insert(&self, job: Job) -> Result<Job, StoreError> {
        let mut guard = self.jobs.write().map_err(|_| poisoned("job"))?;
        if guard.contains_key(&job.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn update(&self, job: Job) -> Result<(), StoreError> {
        let mut guard = self.jobs.write().map_err(|_| poisoned("job"))?;
        match guard.get_mut(&job.id) {
            Some(existing) => {
                *existing = job;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn fetch(&self, id: &JobId) -> Result<Option<Job>, StoreError> {
        let guard = self.jobs.read().map_err(|_| poisoned("job"))?;
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryArtifactStore {
    sequence: Arc<AtomicU64>,
    artifacts: Arc<RwLock<HashMap<ArtifactRef, Value>>>,
}

impl ArtifactStore for InMemoryArtifactStore {
    fn save(
        &self,
        job_id: &JobId,
        target_id: &str,
        artifact: &Value,
    ) -> Result<ArtifactRef, StoreError> {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let reference = ArtifactRef(format!("{job_id}/{target_id}/{sequence:04}"));
        let mut guard = self.artifacts.write().map_err(|_| poisoned("artifact"))?;
        guard.insert(reference.clone(), artifact.clone());
        Ok(reference)
    }

    fn fetch(&self, reference: &ArtifactRef) -> Result<Option<Value>, StoreError> {
        let guard = self.artifacts.read().map_err(|_| poisoned("artifact"))?;
        Ok(guard.get(reference).cloned())
    }
}
