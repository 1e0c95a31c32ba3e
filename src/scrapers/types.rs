use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long the loader waits for a listing page to render.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadinessPolicy {
    /// Polls per navigation before reloading
    pub polls_per_round: u32,
    /// Navigations in total, the first one included
    pub reload_rounds: u32,
    /// Pause after each unsuccessful poll
    pub poll_interval: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            polls_per_round: 10,
            reload_rounds: 5,
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Settings for the per-listing loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineSettings {
    /// Load and extract cycles per listing
    pub max_attempts: u32,
    /// Page readiness waits
    pub readiness: ReadinessPolicy,
    /// Courtesy pause after each listing
    pub inter_url_delay: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            readiness: ReadinessPolicy::default(),
            inter_url_delay: Duration::from_secs(5),
        }
    }
}
