use std::time::{Duration, Instant};

/// Time source for rate-limit windows and backoff sleeps.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    /// Blocks the calling thread.
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
