use std::time::Duration;

use crate::config::{RunConfig, UnknownCountPolicy};

/// Retry budget and pacing for the control loop.
pub struct LoopController {
    config: RunConfig,
}

impl LoopController {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// True once `failure_count` consecutive failures reach the maximum.
    pub fn budget_exhausted(&self, failure_count: u32) -> bool {
        failure_count >= self.config.max_failures
    }

    pub fn max_failures(&self) -> u32 {
        self.config.max_failures
    }

    pub fn success_delay(&self) -> Duration {
        Duration::from_millis(self.config.success_delay_ms)
    }

    pub fn failure_backoff(&self) -> Duration {
        Duration::from_millis(self.config.failure_backoff_ms)
    }

    pub fn unknown_count_policy(&self) -> UnknownCountPolicy {
        self.config.unknown_count_policy
    }
}
