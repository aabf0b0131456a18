//! Retry policy for generative model calls.
//!
//! Implements exponential backoff; only rate-limit and overload responses
//! are retried.

use crate::config::RecommendationSettings;
use crate::llm::LlmError;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each failed attempt.
    pub backoff_multiplier: f64,
}

impl RetryPolicy {
    pub fn new(config: &RecommendationSettings) -> Self {
        Self {
            max_attempts: config.max_attempts,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            ..Default::default()
        }
    }

    /// Delay to wait after the failed attempt number `attempt` (0-based):
    /// `initial_delay * multiplier^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(attempt as i32);
        self.initial_delay.mul_f64(factor)
    }

    /// Whether another attempt should follow the failed attempt number `attempt`.
    pub fn should_retry(&self, error: &LlmError, attempt: u32) -> bool {
        error.is_retryable() && attempt + 1 < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1000),
            backoff_multiplier: 2.0,
        }
    }
}
