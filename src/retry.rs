use std::time::Duration;

use crate::error::Error;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Decides whether a retry-eligible failure is attempted again and how long
/// to wait first.
///
/// `attempt` is 1-based: it numbers the attempt that just failed.
pub trait RetryStrategy: Send + Sync {
    fn should_retry(&self, attempt: usize, failure: &Error) -> bool;

    fn next_delay(&self, attempt: usize) -> Duration;

    /// Upper bound reported in logs, when the strategy has one.
    fn attempt_limit(&self) -> Option<usize> {
        None
    }
}

/// `base_delay × 2^(attempt − 1)` between attempts, no jitter and no cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExponentialBackoff {
    max_attempts: usize,
    base_delay: Duration,
}

impl ExponentialBackoff {
    pub fn new(max_attempts: usize, base_delay: Duration) -> Self {
        Self::standard()
            .max_attempts(max_attempts)
            .base_delay(base_delay)
    }

    pub const fn standard() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }

    /// One attempt, never retried.
    pub const fn disabled() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub const fn base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub const fn configured_max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub const fn configured_base_delay(&self) -> Duration {
        self.base_delay
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::standard()
    }
}

impl RetryStrategy for ExponentialBackoff {
    fn should_retry(&self, attempt: usize, _failure: &Error) -> bool {
        attempt < self.max_attempts
    }

    fn next_delay(&self, attempt: usize) -> Duration {
        if self.base_delay.is_zero() {
            return Duration::ZERO;
        }
        let exponent = attempt.saturating_sub(1).min(u32::MAX as usize) as u32;
        let Some(nanos) = 1_u128
            .checked_shl(exponent)
            .and_then(|multiplier| self.base_delay.as_nanos().checked_mul(multiplier))
        else {
            return Duration::MAX;
        };
        match u64::try_from(nanos / NANOS_PER_SEC) {
            Ok(secs) => Duration::new(secs, (nanos % NANOS_PER_SEC) as u32),
            Err(_) => Duration::MAX,
        }
    }

    fn attempt_limit(&self) -> Option<usize> {
        Some(self.max_attempts)
    }
}
