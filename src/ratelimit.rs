// ABOUTME: Rolling-window rate limiter for provider calls
// ABOUTME: Tracks one independent request window per provider

use crate::provider::Provider;
use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct RateWindow {
    count: u32,
    window_start: Instant,
}

/// Throttles call issuance to stay under each provider's rate ceiling.
///
/// `admit` never errors; exceeding the limit only imposes a delay. Windows
/// reset independently per provider once their length elapses.
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<Provider, RateWindow>>>,
    limit: u32,
    window_length: Duration,
}

impl RateLimiter {
    pub fn new(limit: u32, window_length: Duration) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            limit,
            window_length,
        }
    }

    /// Try to admit one call to `provider`. Returns `Duration::ZERO` when the
    /// call is admitted (and counted); otherwise the time remaining until the
    /// window resets, which the caller must wait out before re-checking.
    pub fn admit(&self, provider: Provider) -> Duration {
        let mut windows = self.windows.lock();
        let now = Instant::now();
        let window = windows.entry(provider).or_insert(RateWindow {
            count: 0,
            window_start: now,
        });

        if now.duration_since(window.window_start) >= self.window_length {
            window.count = 0;
            window.window_start = now;
        }

        if window.count < self.limit {
            window.count += 1;
            Duration::ZERO
        } else {
            let elapsed = now.duration_since(window.window_start);
            let wait = self.window_length - elapsed;
            debug!(
                "Rate window full for {} provider, waiting {} ms",
                provider.label(),
                wait.as_millis()
            );
            wait
        }
    }

    /// Wait until a call to `provider` is admitted.
    pub async fn acquire(&self, provider: Provider) {
        loop {
            let wait = self.admit(provider);
            if wait.is_zero() {
                return;
            }
            tokio::time::sleep(wait).await;
        }
    }
}
