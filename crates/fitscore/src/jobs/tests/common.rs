use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::broadcast::BroadcastRegistry;
use crate::config::JobConfig;
use crate::jobs::{
    Job, JobId, JobKind, JobOrchestrator, JobStatus, TargetError, TargetOperation,
};
use crate::store::{InMemoryArtifactStore, InMemoryJobRepository};

/// Operation that fails or stalls on chosen targets and echoes the rest.
#[derive(Default)]
pub(super) struct ScriptedOperation {
    pub(super) failing: HashSet<String>,
    pub(super) stalling: HashSet<String>,
    pub(super) reject_payload: bool,
    pub(super) calls: AtomicUsize,
}

impl ScriptedOperation {
    pub(super) fn failing_on(targets: &[&str]) -> Self {
        Self {
            failing: targets.iter().map(|target| target.to_string()).collect(),
            ..Self::default()
        }
    }

    pub(super) fn stalling_on(targets: &[&str]) -> Self {
        Self {
            stalling: targets.iter().map(|target| target.to_string()).collect(),
            ..Self::default()
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TargetOperation for ScriptedOperation {
    fn validate(&self, _shared_payload: &Value) -> Result<(), TargetError> {
        if self.reject_payload {
            return Err(TargetError::NotFound("candidate cand-missing".to_string()));
        }
        Ok(())
    }

    async fn run(&self, target_id: &str, shared_payload: &Value) -> Result<Value, TargetError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.stalling.contains(target_id) {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        if self.failing.contains(target_id) {
            return Err(TargetError::Failed(format!("generation failed for {target_id}")));
        }
        Ok(json!({ "target_id": target_id, "shared": shared_payload }))
    }
}

pub(super) struct Harness {
    pub(super) orchestrator: Arc<JobOrchestrator>,
    pub(super) jobs: InMemoryJobRepository,
    pub(super) artifacts: InMemoryArtifactStore,
    pub(super) broadcast: Arc<BroadcastRegistry>,
}

pub(super) fn no_delay() -> JobConfig {
    JobConfig {
        courtesy_delay: Duration::ZERO,
        target_timeout: None,
    }
}

pub(super) fn harness(operation: Arc<ScriptedOperation>, config: JobConfig) -> Harness {
    let jobs = InMemoryJobRepository::default();
    let artifacts = InMemoryArtifactStore::default();
    let broadcast = Arc::new(BroadcastRegistry::new());
    let orchestrator = JobOrchestrator::new(
        Arc::new(jobs.clone()),
        Arc::new(artifacts.clone()),
        broadcast.clone(),
        config,
    )
    .with_operation(JobKind::BatchScore, operation);
    Harness {
        orchestrator: Arc::new(orchestrator),
        jobs,
        artifacts,
        broadcast,
    }
}

pub(super) fn targets(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

/// Poll until the job reaches a terminal state.
pub(super) async fn wait_for_terminal(orchestrator: &JobOrchestrator, job_id: &JobId) -> Job {
    for _ in 0..2_000 {
        let job = orchestrator.get_status(job_id).expect("job exists");
        if job.status.is_terminal() {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("job {job_id} never finished");
}

pub(super) fn drain(receiver: &mut UnboundedReceiver<String>) -> Vec<Value> {
    let mut events = Vec::new();
    while let Ok(raw) = receiver.try_recv() {
        let frame: Value = serde_json::from_str(&raw).expect("json frame");
        events.push(frame["data"].clone());
    }
    events
}

pub(super) fn assert_status(job: &Job, status: JobStatus) {
    assert_eq!(job.status, status, "unexpected job state: {job:?}");
}
