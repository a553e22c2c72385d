//! Retry policy for transient server errors.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Attempt budget used when no policy is configured.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Pause between attempts used when no policy is configured.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Which responses are retried, how often, and how long to wait in between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Statuses treated as transient. Any other status ends the loop.
    pub retry_statuses: Vec<u16>,
    /// Pause before the next attempt, in seconds when serialized.
    #[serde(with = "crate::config::seconds")]
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_statuses: vec![500],
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// A policy that performs exactly one attempt.
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn with_retry_statuses(mut self, statuses: Vec<u16>) -> Self {
        self.retry_statuses = statuses;
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Attempt budget, never less than one.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Returns whether `status`, received on attempt number `attempt`
    /// (1-based), should be followed by another attempt.
    #[must_use]
    pub fn should_retry(&self, status: u16, attempt: u32) -> bool {
        attempt < self.attempts() && self.retry_statuses.contains(&status)
    }
}

/// Blocking pause between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<S: Sleeper + ?Sized> Sleeper for Arc<S> {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}
