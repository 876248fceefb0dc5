//! Backoff policy for rate-limit exhaustion
//!
//! The wait starts from a seed, is multiplied on every retry of the same
//! request, and is capped at a ceiling. Sleeping goes through the [`Timer`]
//! trait so the retry loop can be driven without real delays.

use async_trait::async_trait;
use std::time::Duration;

/// Growth rule for the wait between retries of one logical request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Starting wait; the first retry waits `seed * multiplier`
    pub seed: Duration,
    /// Factor applied on every retry
    pub multiplier: u32,
    /// Upper bound for a single wait
    pub ceiling: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            seed: Duration::from_secs(5),
            multiplier: 2,
            ceiling: Duration::from_secs(30 * 60),
        }
    }
}

impl BackoffPolicy {
    /// Create a doubling policy with the given seed and ceiling
    pub fn new(seed: Duration, ceiling: Duration) -> Self {
        Self {
            seed,
            multiplier: 2,
            ceiling,
        }
    }

    /// Set the multiplier
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: u32) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Wait that follows `current`
    pub fn next_wait(&self, current: Duration) -> Duration {
        std::cmp::min(current.saturating_mul(self.multiplier), self.ceiling)
    }

    /// Start a fresh retry sequence
    pub fn start(&self) -> Backoff {
        Backoff::new(*self)
    }
}

/// Retry state for one logical request
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: BackoffPolicy,
    current: Duration,
    attempt: u32,
}

impl Backoff {
    /// Create retry state positioned at the policy seed
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            current: policy.seed,
            attempt: 0,
        }
    }

    /// Advance to the next wait and return it
    pub fn next_wait(&mut self) -> Duration {
        self.current = self.policy.next_wait(self.current);
        self.attempt += 1;
        self.current
    }

    /// Number of retries scheduled so far
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// The last wait handed out (the seed before the first retry)
    pub fn current(&self) -> Duration {
        self.current
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.next_wait())
    }
}

/// Sleeps between retries
#[async_trait]
pub trait Timer: Send + Sync {
    /// Suspend the caller for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Timer backed by the tokio clock
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[async_trait]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
