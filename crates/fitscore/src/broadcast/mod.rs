//! Channel-based fan-out of score and batch updates to connected observers.
//!
//! Delivery is fire-and-forget: a publish reaches whoever is subscribed at that moment and
//! nothing is buffered for late subscribers.

pub mod message;
pub mod registry;
pub mod socket;

pub use message::{parse_subscribe, Envelope, SubscribeRequest, SubscribeRequestError};
pub use registry::{BroadcastRegistry, ConnectionId, Subscriber};
pub use socket::socket_router;

/// Channel carrying the partial and final score for one candidate/target pair.
pub fn score_channel(candidate_id: &str, target_id: &str) -> String {
    format!("score:{candidate_id}:{target_id}")
}

/// Channel carrying progress events for one batch job.
pub fn batch_channel(job_id: &str) -> String {
    format!("batch:{job_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_names_follow_the_prefix_convention() {
        assert_eq!(score_channel("cand-1", "post-9"), "score:cand-1:post-9");
        assert_eq!(batch_channel("job-000004"), "batch:job-000004");
    }
}
