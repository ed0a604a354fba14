use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::breakdown::ScoreResult;
use super::domain::{CandidateDocument, EmbeddingPair, TargetDocument};
use super::service::{ScoringService, ScoringServiceError};

/// Body of `POST /api/v1/score`.
#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub candidate: CandidateDocument,
    pub target: TargetDocument,
    #[serde(default)]
    pub candidate_text: Option<String>,
    #[serde(default)]
    pub embeddings: Option<EmbeddingPair>,
}

/// Router builder exposing the scoring endpoints.
pub fn scoring_router(service: Arc<ScoringService>) -> Router {
    Router::new()
        .route("/api/v1/score", post(score_inline_handler))
        .route(
            "/api/v1/candidates/:candidate_id/targets/:target_id/score",
            post(score_stored_handler),
        )
        .with_state(service)
}

pub(crate) async fn score_inline_handler(
    State(service): State<Arc<ScoringService>>,
    Json(request): Json<ScoreRequest>,
) -> Response {
    if request.candidate.id.trim().is_empty() || request.target.id.trim().is_empty() {
        let payload = json!({ "error": "candidate.id and target.id are required" });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
    }

    let outcome = service
        .score_documents(
            request.candidate,
            request.target,
            request.candidate_text,
            request.embeddings,
        )
        .await;
    respond(outcome)
}

pub(crate) async fn score_stored_handler(
    State(service): State<Arc<ScoringService>>,
    Path((candidate_id, target_id)): Path<(String, String)>,
) -> Response {
    respond(service.score(&candidate_id, &target_id).await)
}

fn respond(outcome: Result<ScoreResult, ScoringServiceError>) -> Response {
    match outcome {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(ScoringServiceError::NotFound(what)) => {
            let payload = json!({ "error": format!("{what} not found") });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
