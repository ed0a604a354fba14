use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::jobs::{job_router, JobId, JobKind, JobPayload};

async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn batch_request(body: Value) -> Request<Body> {
    Request::post("/api/v1/batch")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn batch_submission_is_accepted_with_a_job_id() {
    let harness = harness(Arc::new(ScriptedOperation::default()), no_delay());

    let response = job_router(harness.orchestrator.clone())
        .oneshot(batch_request(json!({
            "targets": ["post-1", "post-2"],
            "shared_payload": { "candidate_id": "cand-1" },
        })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], "pending");
    let job_id = payload["job_id"].as_str().expect("job id").to_string();

    let job = harness
        .orchestrator
        .get_status(&JobId(job_id))
        .expect("job stored");
    assert_eq!(job.payload.targets, targets(&["post-1", "post-2"]));
}

#[tokio::test]
async fn batch_without_targets_is_unprocessable() {
    let harness = harness(Arc::new(ScriptedOperation::default()), no_delay());

    let response = job_router(harness.orchestrator.clone())
        .oneshot(batch_request(json!({ "targets": ["  "], "shared_payload": {} })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn job_status_route_reports_progress_and_missing_jobs() {
    let harness = harness(Arc::new(ScriptedOperation::failing_on(&["t-2"])), no_delay());
    let job = harness
        .orchestrator
        .enqueue(
            JobKind::BatchScore,
            JobPayload {
                targets: targets(&["t-1", "t-2"]),
                shared_payload: json!({ "candidate_id": "cand-1" }),
            },
        )
        .expect("enqueued");
    wait_for_terminal(&harness.orchestrator, &job.id).await;

    let response = job_router(harness.orchestrator.clone())
        .oneshot(
            Request::get(format!("/api/v1/jobs/{}", job.id))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], "completed");
    assert_eq!(payload["kind"], "batch_score");
    assert_eq!(payload["progress"], 100);
    assert_eq!(payload["artifacts"]["results"][1]["success"], false);

    let response = job_router(harness.orchestrator.clone())
        .oneshot(
            Request::get("/api/v1/jobs/job-unknown")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
