//! Polite request pacing for requests to the gazette site.
//!
//! A single governor quota spaces requests out; there is no retry. A 429 or
//! any other non-success status surfaces to the caller as a fetch error.

use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

/// Type alias for governor's direct rate limiter.
type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Spaces requests at least `interval` apart. A zero interval disables pacing.
pub struct RequestPacer {
    limiter: Option<DirectLimiter>,
    interval: Duration,
}

impl RequestPacer {
    pub fn new(interval: Duration) -> Self {
        let limiter = Quota::with_period(interval).map(DirectLimiter::direct);
        Self { limiter, interval }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// A pacer that never waits.
    pub fn unpaced() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_paced(&self) -> bool {
        self.limiter.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the next request is allowed.
    pub async fn acquire(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

impl std::fmt::Debug for RequestPacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPacer")
            .field("interval", &self.interval)
            .field("paced", &self.is_paced())
            .finish()
    }
}
