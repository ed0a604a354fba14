use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::jobs::operation::{resolve_candidate, TargetError, TargetOperation};
use crate::scoring::tailor;
use crate::store::DocumentStore;

/// Produces a reordered draft of the batch candidate for each target.
pub struct TailorOperation {
    documents: Arc<dyn DocumentStore>,
}

impl TailorOperation {
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl TargetOperation for TailorOperation {
    fn validate(&self, shared_payload: &Value) -> Result<(), TargetError> {
        resolve_candidate(self.documents.as_ref(), shared_payload).map(|_| ())
    }

    async fn run(&self, target_id: &str, shared_payload: &Value) -> Result<Value, TargetError> {
        let candidate = resolve_candidate(self.documents.as_ref(), shared_payload)?;
        let target = self
            .documents
            .target(target_id)?
            .ok_or_else(|| TargetError::NotFound(format!("target {target_id}")))?;

        let draft = tailor::tailor(&candidate, &target);
        serde_json::to_value(&draft).map_err(|err| TargetError::Failed(err.to_string()))
    }
}
