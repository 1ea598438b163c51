//! Probe pacing.
//!
//! Token bucket rate limiting caps how many probes per second the scan sends,
//! so a long sweep against a shared host stays polite.

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter as GovLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

/// A rate limiter for controlling probe speed.
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<DefaultDirectRateLimiter>,
    rate: NonZeroU32,
}

impl RateLimiter {
    /// Create a limiter allowing `rate` probes per second.
    ///
    /// Returns `None` for a rate of zero, which means unlimited.
    pub fn new(rate: u32) -> Option<Self> {
        let rate = NonZeroU32::new(rate)?;
        // One probe in flight at a time, so a burst of one keeps spacing even.
        let quota = Quota::per_second(rate).allow_burst(NonZeroU32::MIN);

        Some(Self {
            limiter: Arc::new(GovLimiter::direct(quota)),
            rate,
        })
    }

    /// Wait until the next probe is allowed.
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Configured probes per second.
    pub fn rate(&self) -> u32 {
        self.rate.get()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").field("rate", &self.rate).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_zero_rate_is_unlimited() {
        assert!(RateLimiter::new(0).is_none());
    }

    #[tokio::test]
    async fn test_rate_limiter_creation() {
        let limiter = RateLimiter::new(100).unwrap();
        assert_eq!(limiter.rate(), 100);
        // First token is available immediately
        let start = Instant::now();
        limiter.wait().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_rate_limiter_wait() {
        let limiter = RateLimiter::new(1000).unwrap();
        limiter.wait().await;
        limiter.wait().await;
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let limiter1 = RateLimiter::new(10).unwrap();
        let limiter2 = limiter1.clone();

        let start = Instant::now();
        limiter1.wait().await;
        limiter2.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(80));
    }
}
