use serde_json::Value;

use super::domain::{ArtifactRef, Job, JobId};
use crate::store::StoreError;

/// Storage abstraction for jobs so the orchestrator can be exercised in isolation.
pub trait JobRepository: Send + Sync {
    fn insert(&self, job: Job) -> Result<Job, StoreError>;
    fn update(&self, job: Job) -> Result<(), StoreError>;
    fn fetch(&self, id: &JobId) -> Result<Option<Job>, StoreError>;
}

/// Destination for the artifact each successful target produces.
pub trait ArtifactStore: Send + Sync {
    fn save(
        &self,
        job_id: &JobId,
        target_id: &str,
        artifact: &Value,
    ) -> Result<ArtifactRef, StoreError>;
    fn fetch(&self, reference: &ArtifactRef) -> Result<Option<Value>, StoreError>;
}
