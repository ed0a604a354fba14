//! Background multi-target jobs with progress reporting.
//!
//! A job moves `pending -> running -> {completed, error}`. Targets run one after another with
//! a courtesy delay in between; a failing target is recorded and the batch carries on.

pub mod domain;
pub mod operation;
pub mod operations;
pub mod orchestrator;
pub mod progress;
pub mod repository;
pub mod router;

#[cfg(test)]
mod tests;

pub use domain::{
    ArtifactRef, Job, JobArtifacts, JobError, JobId, JobKind, JobPayload, JobStatus,
    TargetOutcome,
};
pub use operation::{resolve_candidate, TargetError, TargetOperation};
pub use operations::{BatchScoreOperation, TailorOperation};
pub use orchestrator::{JobOrchestrator, OrchestratorError};
pub use progress::{ProgressEvent, ProgressStatus};
pub use repository::{ArtifactStore, JobRepository};
pub use router::job_router;
