//! Per-provider minimum-interval rate limiting.
//!
//! Each provider name gets an independent schedule. The limiter is meant to
//! be shared (behind an `Arc`) by every resolution in the process, since it
//! gates an external quota rather than per-run work.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Spaces out calls to each provider by at least `min_interval`.
#[derive(Debug)]
pub struct ProviderRateLimiter {
    min_interval: Duration,
    /// Last slot handed out per provider.
    last_slot: Mutex<HashMap<String, Instant>>,
}

impl ProviderRateLimiter {
    /// Create a limiter with the given minimum interval per provider.
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_slot: Mutex::new(HashMap::new()),
        }
    }

    /// Wait until `provider` may be called again.
    ///
    /// The slot is reserved under the lock and the wait happens outside it,
    /// so concurrent callers queue up one interval apart instead of racing.
    pub async fn acquire(&self, provider: &str) {
        let slot = self.reserve(provider, Instant::now());
        if slot > Instant::now() {
            tracing::trace!(provider, "rate limited, waiting for slot");
            tokio::time::sleep_until(slot).await;
        }
    }

    /// Reserve the next free slot for `provider` at or after `now`.
    fn reserve(&self, provider: &str, now: Instant) -> Instant {
        // A poisoned map only holds timestamps; keep using it.
        let mut slots = self
            .last_slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let slot = match slots.get(provider) {
            Some(&last) => (last + self.min_interval).max(now),
            None => now,
        };
        slots.insert(provider.to_owned(), slot);
        slot
    }

    #[must_use]
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

impl Default for ProviderRateLimiter {
    fn default() -> Self {
        Self::new(Duration::from_millis(1_500))
    }
}
