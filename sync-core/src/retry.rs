//! Retry policy for transient remote-store failures.
//!
//! Uses bounded exponential backoff with random jitter:
//!
//! ```text
//! delay(n) = min(max_delay, base_delay * 2^(n-1)) + random(0..base_delay)
//! ```
//!
//! where `n` is the number of the attempt that just failed (1-based).

use std::time::Duration;

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Always at least 1.
    pub max_attempts: u32,
    /// Delay after the first failure, before jitter.
    pub base_delay: Duration,
    /// Cap on the exponential part of the delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` below 1 is raised to 1.
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Whether another attempt is allowed after `attempt` failed.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Backoff before retrying after `attempt` failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let base = self
            .base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay);
        base + self.jitter()
    }

    fn jitter(&self) -> Duration {
        let span = self.base_delay.as_millis() as u64;
        if span == 0 {
            return Duration::ZERO;
        }
        let mut bytes = [0u8; 8];
        match getrandom::getrandom(&mut bytes) {
            Ok(()) => Duration::from_millis(u64::from_le_bytes(bytes) % span),
            Err(_) => Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(4, Duration::from_millis(200), Duration::from_secs(5))
    }
}
