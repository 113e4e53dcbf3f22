use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::Result;
use crate::error::Error;
use crate::extensions::{Clock, SystemClock};
use crate::util::lock_unpoisoned;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitPolicy {
    limit: usize,
    window: Duration,
}

impl RateLimitPolicy {
    /// Ten requests per sixty seconds.
    pub const fn standard() -> Self {
        Self {
            limit: 10,
            window: Duration::from_secs(60),
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub const fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub const fn configured_limit(&self) -> usize {
        self.limit
    }

    pub const fn configured_window(&self) -> Duration {
        self.window
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Default)]
struct FixedWindow {
    count: usize,
    started_at: Option<Instant>,
}

impl FixedWindow {
    fn try_admit(&mut self, policy: RateLimitPolicy, now: Instant) -> bool {
        let expired = match self.started_at {
            Some(started_at) => now.saturating_duration_since(started_at) > policy.window,
            None => true,
        };
        if expired {
            self.started_at = Some(now);
            self.count = 1;
            return true;
        }
        if self.count < policy.limit {
            self.count += 1;
            return true;
        }
        false
    }
}

/// Fixed-window admission counter shared by every caller of one client.
pub struct RateLimiter {
    policy: RateLimitPolicy,
    state: Mutex<FixedWindow>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: RateLimitPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            policy: policy.limit(policy.limit),
            state: Mutex::new(FixedWindow::default()),
            clock,
        }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Counts one request against the current window.
    ///
    /// A window opens on the first call and after the previous one has fully
    /// elapsed; a full window rejects until then.
    pub fn admit(&self) -> Result<()> {
        let now = self.clock.now();
        let admitted = lock_unpoisoned(&self.state).try_admit(self.policy, now);
        if admitted {
            return Ok(());
        }
        debug!(
            limit = self.policy.limit,
            window_secs = self.policy.window.as_secs(),
            "rate limit exceeded"
        );
        Err(Error::RateLimitExceeded {
            limit: self.policy.limit,
            window: self.policy.window,
        })
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("RateLimiter")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::{RateLimitPolicy, RateLimiter};
    use crate::error::Error;
    use crate::extensions::Clock;
    use crate::tests::ManualClock;

    fn limiter(limit: usize, window: Duration) -> (RateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let policy = RateLimitPolicy::standard().limit(limit).window(window);
        (RateLimiter::with_clock(policy, clock.clone()), clock)
    }

    #[test]
    fn rejects_once_window_is_full() {
        let (limiter, _clock) = limiter(3, Duration::from_secs(60));
        for _ in 0..3 {
            limiter.admit().expect("request within limit");
        }
        match limiter.admit() {
            Err(Error::RateLimitExceeded { limit, window }) => {
                assert_eq!(limit, 3);
                assert_eq!(window, Duration::from_secs(60));
            }
            other => panic!("expected rate limit rejection, got {other:?}"),
        }
    }

    #[test]
    fn window_resets_only_after_it_has_fully_elapsed() {
        let (limiter, clock) = limiter(1, Duration::from_secs(60));
        limiter.admit().expect("first request");

        clock.sleep(Duration::from_secs(60));
        assert!(limiter.admit().is_err());

        clock.sleep(Duration::from_millis(1));
        limiter.admit().expect("fresh window");
        assert!(limiter.admit().is_err());
    }

    #[test]
    fn zero_limit_is_normalized_to_one() {
        let (limiter, _clock) = limiter(0, Duration::from_secs(1));
        assert_eq!(limiter.policy().configured_limit(), 1);
        limiter.admit().expect("one request is always allowed");
    }

    #[test]
    fn concurrent_admissions_never_exceed_limit() {
        let (limiter, _clock) = limiter(5, Duration::from_secs(60));
        let limiter = Arc::new(limiter);
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || limiter.admit().is_ok())
            })
            .collect();
        let admitted = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread should finish"))
            .filter(|admitted| *admitted)
            .count();
        assert_eq!(admitted, 5);
    }
}
