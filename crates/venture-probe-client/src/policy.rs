//! Retry policy injected into the request client.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delay between consecutive attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "millis", rename_all = "snake_case")]
pub enum DelaySchedule {
    /// Same delay before every retry
    Fixed(u64),
    /// Delay grows with the attempt number (`base * attempt`)
    Linear(u64),
}

impl DelaySchedule {
    /// Delay to wait after the given failed attempt (1-based).
    pub fn after_attempt(&self, attempt: u32) -> Duration {
        match *self {
            DelaySchedule::Fixed(ms) => Duration::from_millis(ms),
            DelaySchedule::Linear(ms) => Duration::from_millis(ms.saturating_mul(attempt as u64)),
        }
    }
}

fn never_retry_status(_status: u16) -> bool {
    false
}

/// Bounded retry policy: attempt budget, delay schedule and a predicate that
/// selects HTTP statuses worth retrying even though the body parsed.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Values below 1 act as 1.
    pub max_attempts: u32,
    /// Delay between attempts.
    pub delay: DelaySchedule,
    retry_on_status: fn(u16) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            delay: DelaySchedule::Fixed(1000),
            retry_on_status: never_retry_status,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given budget and schedule.
    pub fn new(max_attempts: u32, delay: DelaySchedule) -> Self {
        RetryPolicy {
            max_attempts,
            delay,
            ..Self::default()
        }
    }

    /// Retry parsed responses whose status matches `predicate`.
    pub fn with_status_predicate(mut self, predicate: fn(u16) -> bool) -> Self {
        self.retry_on_status = predicate;
        self
    }

    /// Attempt budget, never below one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Whether a parsed response with this status should be retried.
    pub fn should_retry_status(&self, status: u16) -> bool {
        (self.retry_on_status)(status)
    }
}
