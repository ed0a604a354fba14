use serde::Serialize;

use super::domain::{JobId, TargetOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Generating,
    Completed,
    Error,
}

/// Event published on `batch:{job_id}` while a job runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEvent {
    pub job_id: JobId,
    pub status: ProgressStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<TargetOutcome>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressEvent {
    pub fn generating(job_id: &JobId, progress: u8, current: &str) -> Self {
        Self {
            job_id: job_id.clone(),
            status: ProgressStatus::Generating,
            progress,
            current: Some(current.to_string()),
            results: None,
            error: None,
        }
    }

    pub fn completed(job_id: &JobId, results: Vec<TargetOutcome>) -> Self {
        Self {
            job_id: job_id.clone(),
            status: ProgressStatus::Completed,
            progress: 100,
            current: None,
            results: Some(results),
            error: None,
        }
    }

    pub fn failed(job_id: &JobId, progress: u8, error: impl Into<String>) -> Self {
        Self {
            job_id: job_id.clone(),
            status: ProgressStatus::Error,
            progress,
            current: None,
            results: None,
            error: Some(error.into()),
        }
    }
}

/// Share of targets started before `index`, as a whole percentage.
pub(crate) fn percent_before(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((index.min(total) * 100) as f64 / total as f64).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_before_spreads_targets_evenly() {
        assert_eq!(percent_before(0, 3), 0);
        assert_eq!(percent_before(1, 3), 33);
        assert_eq!(percent_before(2, 3), 67);
        assert_eq!(percent_before(0, 0), 0);
    }

    #[test]
    fn generating_event_omits_results() {
        let event = ProgressEvent::generating(&JobId("job-1".to_string()), 33, "post-2");
        let value = serde_json::to_value(event).expect("serializes");
        assert_eq!(value["status"], "generating");
        assert_eq!(value["current"], "post-2");
        assert!(value.get("results").is_none());
        assert!(value.get("error").is_none());
    }
}
