use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::scoring::CandidateDocument;
use crate::store::{DocumentStore, StoreError};

/// Work performed for each target of a job kind.
#[async_trait]
pub trait TargetOperation: Send + Sync {
    /// Checked once before any target runs. An error here fails the whole job.
    fn validate(&self, shared_payload: &Value) -> Result<(), TargetError>;

    /// Produce the artifact for one target.
    async fn run(&self, target_id: &str, shared_payload: &Value) -> Result<Value, TargetError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Failed(String),
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

#[derive(Debug, Default, Deserialize)]
struct CandidateReference {
    #[serde(default)]
    candidate_id: Option<String>,
    #[serde(default)]
    candidate: Option<CandidateDocument>,
}

/// The candidate a batch is about: embedded in the shared payload under `candidate`, or
/// looked up through `candidate_id`.
pub fn resolve_candidate(
    documents: &dyn DocumentStore,
    shared_payload: &Value,
) -> Result<CandidateDocument, TargetError> {
    let reference: CandidateReference = serde_json::from_value(shared_payload.clone())
        .map_err(|err| TargetError::InvalidPayload(err.to_string()))?;

    if let Some(candidate) = reference.candidate {
        return Ok(candidate);
    }
    match reference.candidate_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => documents
            .candidate(id)?
            .ok_or_else(|| TargetError::NotFound(format!("candidate {id}"))),
        _ => Err(TargetError::InvalidPayload(
            "shared_payload needs a candidate_id or an embedded candidate".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::TargetDocument;
    use crate::store::InMemoryDocumentStore;
    use serde_json::json;

    fn store() -> InMemoryDocumentStore {
        InMemoryDocumentStore::with_documents(
            [CandidateDocument {
                id: "cand-1".to_string(),
                name: "Grace Hopper".to_string(),
                ..CandidateDocument::default()
            }],
            Vec::<TargetDocument>::new(),
        )
    }

    #[test]
    fn resolves_by_id_or_embedded_document() {
        let store = store();
        let by_id = resolve_candidate(&store, &json!({"candidate_id": "cand-1"})).expect("found");
        assert_eq!(by_id.name, "Grace Hopper");

        let embedded = resolve_candidate(
            &store,
            &json!({"candidate": {"id": "inline", "name": "Inline"}}),
        )
        .expect("embedded");
        assert_eq!(embedded.id, "inline");
    }

    #[test]
    fn missing_subject_is_reported() {
        let store = store();
        assert!(matches!(
            resolve_candidate(&store, &json!({"candidate_id": "ghost"})),
            Err(TargetError::NotFound(_))
        ));
        assert!(matches!(
            resolve_candidate(&store, &json!({})),
            Err(TargetError::InvalidPayload(_))
        ));
        assert!(matches!(
            resolve_candidate(&store, &Value::Null),
            Err(TargetError::InvalidPayload(_))
        ));
    }
}
