use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier wrapper for batch jobs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Score one candidate against every target.
    #[default]
    BatchScore,
    /// Produce a tailored draft of the candidate for every target.
    BatchTailor,
}

impl JobKind {
    pub const fn label(self) -> &'static str {
        match self {
            JobKind::BatchScore => "batch_score",
            JobKind::BatchTailor => "batch_tailor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Error,
}

impl JobStatus {
    pub const fn label(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }

    /// `pending -> running -> {completed, error}`; nothing moves backwards.
    pub const fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Completed)
                | (JobStatus::Running, JobStatus::Error)
        )
    }
}

/// Targets to process plus the kind-specific payload shared by all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPayload {
    pub targets: Vec<String>,
    #[serde(default)]
    pub shared_payload: Value,
}

/// Stored reference to a persisted per-target artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactRef(pub String);

/// Per-target line in a job's results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetOutcome {
    pub target_id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_ref: Option<ArtifactRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TargetOutcome {
    pub fn succeeded(target_id: impl Into<String>, artifact_ref: ArtifactRef) -> Self {
        Self {
            target_id: target_id.into(),
            success: true,
            artifact_ref: Some(artifact_ref),
            error: None,
        }
    }

    pub fn failed(target_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            success: false,
            artifact_ref: None,
            error: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobArtifacts {
    pub results: Vec<TargetOutcome>,
}

impl JobArtifacts {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|outcome| outcome.success).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

/// Long-running multi-target request owned by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub kind: JobKind,
    pub payload: JobPayload,
    pub status: JobStatus,
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<JobArtifacts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(id: JobId, kind: JobKind, payload: JobPayload, now: DateTime<Utc>) -> Self {
        Self {
            id,
            kind,
            payload,
            status: JobStatus::Pending,
            progress: 0,
            artifacts: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn transition(&mut self, next: JobStatus, now: DateTime<Utc>) -> Result<(), JobError> {
        if !self.status.can_transition_to(next) {
            return Err(JobError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// Record progress while running. Progress never decreases.
    pub fn advance(&mut self, progress: u8, now: DateTime<Utc>) -> Result<(), JobError> {
        if self.status != JobStatus::Running {
            return Err(JobError::NotRunning(self.status));
        }
        self.progress = self.progress.max(progress.min(100));
        self.updated_at = now;
        Ok(())
    }

    pub fn complete(
        &mut self,
        results: Vec<TargetOutcome>,
        now: DateTime<Utc>,
    ) -> Result<(), JobError> {
        self.transition(JobStatus::Completed, now)?;
        self.progress = 100;
        self.artifacts = Some(JobArtifacts { results });
        Ok(())
    }

    pub fn fail(&mut self, reason: impl Into<String>, now: DateTime<Utc>) -> Result<(), JobError> {
        self.transition(JobStatus::Error, now)?;
        self.error = Some(reason.into());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobError {
    #[error("job cannot move from {} to {}", .from.label(), .to.label())]
    InvalidTransition { from: JobStatus, to: JobStatus },
    #[error("job is {}, not running", .0.label())]
    NotRunning(JobStatus),
}
