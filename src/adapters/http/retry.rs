//! Retry Policy
//!
//! Attempt budget and backoff schedule shared by every outbound request.

use std::time::Duration;

use super::error::RequestError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Exponential backoff base: `base_delay * 2^attempt`
    pub base_delay: Duration,
    /// Linear step after HTTP 429: `rate_limit_delay * (attempt + 1)`
    pub rate_limit_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            rate_limit_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Same attempt budget, no sleeping.
    pub fn immediate() -> Self {
        Self {
            base_delay: Duration::ZERO,
            rate_limit_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Delay after a failed `attempt` (0-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    pub fn rate_limit_backoff(&self, attempt: u32) -> Duration {
        self.rate_limit_delay.saturating_mul(attempt.saturating_add(1))
    }

    pub fn delay_for(&self, error: &RequestError, attempt: u32) -> Duration {
        match error {
            RequestError::RateLimited => self.rate_limit_backoff(attempt),
            _ => self.backoff(attempt),
        }
    }
}
