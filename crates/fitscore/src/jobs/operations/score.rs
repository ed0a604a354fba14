use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::jobs::operation::{resolve_candidate, TargetError, TargetOperation};
use crate::scoring::ScoringService;

/// Scores the batch candidate against each target. Results are persisted and broadcast on
/// the pair's score channel by the scoring service.
pub struct BatchScoreOperation {
    service: Arc<ScoringService>,
}

impl BatchScoreOperation {
    pub fn new(service: Arc<ScoringService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl TargetOperation for BatchScoreOperation {
    fn validate(&self, shared_payload: &Value) -> Result<(), TargetError> {
        resolve_candidate(self.service.documents().as_ref(), shared_payload).map(|_| ())
    }

    async fn run(&self, target_id: &str, shared_payload: &Value) -> Result<Value, TargetError> {
        let documents = self.service.documents();
        let candidate = resolve_candidate(documents.as_ref(), shared_payload)?;
        let target = documents
            .target(target_id)?
            .ok_or_else(|| TargetError::NotFound(format!("target {target_id}")))?;

        let result = self.service.score_pair(&candidate, &target).await;
        serde_json::to_value(&result).map_err(|err| TargetError::Failed(err.to_string()))
    }
}
