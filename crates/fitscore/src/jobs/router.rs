use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::domain::{JobId, JobKind, JobPayload};
use super::orchestrator::{JobOrchestrator, OrchestratorError};

/// Body of `POST /api/v1/batch`.
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub kind: JobKind,
    pub targets: Vec<String>,
    #[serde(default)]
    pub shared_payload: Value,
}

/// Router builder exposing batch submission and job status.
pub fn job_router(orchestrator: Arc<JobOrchestrator>) -> Router {
    Router::new()
        .route("/api/v1/batch", post(submit_handler))
        .route("/api/v1/jobs/:job_id", get(status_handler))
        .with_state(orchestrator)
}

pub(crate) async fn submit_handler(
    State(orchestrator): State<Arc<JobOrchestrator>>,
    Json(request): Json<BatchRequest>,
) -> Response {
    let targets: Vec<String> = request
        .targets
        .into_iter()
        .map(|target| target.trim().to_string())
        .filter(|target| !target.is_empty())
        .collect();
    if targets.is_empty() {
        let payload = json!({ "error": "targets must name at least one target id" });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
    }

    let payload = JobPayload {
        targets,
        shared_payload: request.shared_payload,
    };
    match orchestrator.enqueue(request.kind, payload) {
        Ok(job) => {
            let payload = json!({
                "job_id": job.id,
                "status": job.status.label(),
            });
            (StatusCode::ACCEPTED, Json(payload)).into_response()
        }
        Err(OrchestratorError::UnsupportedKind(kind)) => {
            let payload = json!({ "error": format!("unsupported job kind {}", kind.label()) });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn status_handler(
    State(orchestrator): State<Arc<JobOrchestrator>>,
    Path(job_id): Path<String>,
) -> Response {
    match orchestrator.get_status(&JobId(job_id)) {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(err @ OrchestratorError::NotFound(_)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
