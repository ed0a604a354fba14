use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::domain::{
    ArtifactRef, Job, JobError, JobId, JobKind, JobPayload, JobStatus, TargetOutcome,
};
use super::operation::{TargetError, TargetOperation};
use super::progress::{percent_before, ProgressEvent};
use super::repository::{ArtifactStore, JobRepository};
use crate::broadcast::{batch_channel, BroadcastRegistry};
use crate::config::JobConfig;
use crate::store::StoreError;

static JOB_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_job_id() -> JobId {
    let id = JOB_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    JobId(format!("job-{id:06}"))
}

/// Owns job state, runs each job in its own task and reports progress on `batch:{job_id}`.
pub struct JobOrchestrator {
    jobs: Arc<dyn JobRepository>,
    artifacts: Arc<dyn ArtifactStore>,
    broadcast: Arc<BroadcastRegistry>,
    operations: HashMap<JobKind, Arc<dyn TargetOperation>>,
    config: JobConfig,
}

impl JobOrchestrator {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        artifacts: Arc<dyn ArtifactStore>,
        broadcast: Arc<BroadcastRegistry>,
        config: JobConfig,
    ) -> Self {
        Self {
            jobs,
            artifacts,
            broadcast,
            operations: HashMap::new(),
            config,
        }
    }

    pub fn with_operation(mut self, kind: JobKind, operation: Arc<dyn TargetOperation>) -> Self {
        self.operations.insert(kind, operation);
        self
    }

    /// Persist a pending job and start processing it in the background. Returns before any
    /// target runs.
    pub fn enqueue(
        self: &Arc<Self>,
        kind: JobKind,
        payload: JobPayload,
    ) -> Result<Job, OrchestratorError> {
        if !self.operations.contains_key(&kind) {
            return Err(OrchestratorError::UnsupportedKind(kind));
        }

        let job = self
            .jobs
            .insert(Job::new(next_job_id(), kind, payload, Utc::now()))?;
        info!(
            job_id = %job.id,
            kind = kind.label(),
            targets = job.payload.targets.len(),
            "job enqueued"
        );

        let orchestrator = Arc::clone(self);
        let job_id = job.id.clone();
        tokio::spawn(async move {
            if let Err(err) = orchestrator.process(&job_id).await {
                error!(job_id = %job_id, error = %err, "job processing aborted");
            }
        });

        Ok(job)
    }

    pub fn get_status(&self, job_id: &JobId) -> Result<Job, OrchestratorError> {
        self.jobs
            .fetch(job_id)?
            .ok_or_else(|| OrchestratorError::NotFound(job_id.clone()))
    }

    /// Run a pending job to a terminal state. Once the job is running, any failure that
    /// escapes the target loop leaves it in `error` rather than stuck in `running`.
    pub async fn process(&self, job_id: &JobId) -> Result<Job, OrchestratorError> {
        let mut job = self.get_status(job_id)?;
        job.transition(JobStatus::Running, Utc::now())?;
        self.jobs.update(job.clone())?;

        match self.execute(job).await {
            Ok(job) => Ok(job),
            Err(err) => {
                self.abandon(job_id, &err);
                Err(err)
            }
        }
    }

    async fn execute(&self, mut job: Job) -> Result<Job, OrchestratorError> {
        let channel = batch_channel(&job.id.0);

        let Some(operation) = self.operations.get(&job.kind).cloned() else {
            let reason = format!("no operation for {}", job.kind.label());
            return self.fail(job, &channel, reason);
        };
        if let Err(err) = operation.validate(&job.payload.shared_payload) {
            return self.fail(job, &channel, err.to_string());
        }

        let targets = job.payload.targets.clone();
        let shared_payload = job.payload.shared_payload.clone();
        let mut results = Vec::with_capacity(targets.len());

        for (index, target_id) in targets.iter().enumerate() {
            if index > 0 && !self.config.courtesy_delay.is_zero() {
                tokio::time::sleep(self.config.courtesy_delay).await;
            }

            let progress = percent_before(index, targets.len());
            job.advance(progress, Utc::now())?;
            self.checkpoint(&job);
            self.broadcast.publish(
                &channel,
                &ProgressEvent::generating(&job.id, job.progress, target_id),
            );

            let outcome = match self
                .run_target(operation.as_ref(), &job.id, target_id, &shared_payload)
                .await
            {
                Ok(reference) => {
                    debug!(job_id = %job.id, target_id = %target_id, "target finished");
                    TargetOutcome::succeeded(target_id.as_str(), reference)
                }
                Err(err) => {
                    warn!(job_id = %job.id, target_id = %target_id, error = %err, "target failed");
                    TargetOutcome::failed(target_id.as_str(), err.to_string())
                }
            };
            results.push(outcome);
        }

        job.complete(results, Utc::now())?;
        // Persist first so an observer reacting to the event reads the terminal state.
        self.jobs.update(job.clone())?;

        let artifacts = job.artifacts.clone().unwrap_or_default();
        info!(
            job_id = %job.id,
            succeeded = artifacts.succeeded(),
            failed = artifacts.failed(),
            "job completed"
        );
        self.broadcast
            .publish(&channel, &ProgressEvent::completed(&job.id, artifacts.results));
        Ok(job)
    }

    async fn run_target(
        &self,
        operation: &dyn TargetOperation,
        job_id: &JobId,
        target_id: &str,
        shared_payload: &Value,
    ) -> Result<ArtifactRef, TargetError> {
        let artifact = match self.config.target_timeout {
            Some(limit) => tokio::time::timeout(limit, operation.run(target_id, shared_payload))
                .await
                .map_err(|_| TargetError::TimedOut(limit))??,
            None => operation.run(target_id, shared_payload).await?,
        };
        Ok(self.artifacts.save(job_id, target_id, &artifact)?)
    }

    fn fail(&self, mut job: Job, channel: &str, reason: String) -> Result<Job, OrchestratorError> {
        job.fail(reason.clone(), Utc::now())?;
        self.jobs.update(job.clone())?;
        error!(job_id = %job.id, error = %reason, "job failed");
        self.broadcast
            .publish(channel, &ProgressEvent::failed(&job.id, job.progress, reason));
        Ok(job)
    }

    fn abandon(&self, job_id: &JobId, cause: &OrchestratorError) {
        let job = match self.jobs.fetch(job_id) {
            Ok(Some(job)) if job.status == JobStatus::Running => job,
            _ => return,
        };
        let channel = batch_channel(&job_id.0);
        if let Err(err) = self.fail(job, &channel, cause.to_string()) {
            error!(job_id = %job_id, error = %err, "could not record job failure");
        }
    }

    /// Progress writes are best effort; a failed write only delays what readers see.
    fn checkpoint(&self, job: &Job) {
        if let Err(err) = self.jobs.update(job.clone()) {
            warn!(job_id = %job.id, error = %err, "failed to persist job progress");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("job {0} not found")]
    NotFound(JobId),
    #[error("no operation registered for {}", .0.label())]
    UnsupportedKind(JobKind),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Job(#[from] JobError),
}
