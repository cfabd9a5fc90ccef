//! Probe-issuance rate limiting.
//!
//! A single token-bucket limiter is shared by every worker, capping outbound
//! connection attempts per second independently of how many workers are idle.

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovLimiter};
use nonzero_ext::nonzero;
use std::num::NonZeroU32;
use std::sync::Arc;

/// Shared rate limiter for probe issuance.
///
/// Cloning is cheap and every clone draws from the same bucket.
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<GovLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl RateLimiter {
    /// Create a limiter allowing `rate` probes per second with a burst of
    /// `burst`. Zero values are clamped to one.
    pub fn new(rate: u32, burst: u32) -> Self {
        let rate = NonZeroU32::new(rate).unwrap_or(nonzero!(1u32));
        let burst = NonZeroU32::new(burst).unwrap_or(nonzero!(1u32));
        let quota = Quota::per_second(rate).allow_burst(burst);

        Self {
            limiter: Arc::new(GovLimiter::direct(quota)),
        }
    }

    /// Suspend until a permit is available.
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }
}
