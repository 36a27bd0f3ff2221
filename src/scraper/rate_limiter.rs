use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

/// Enforces a minimum interval between consecutive requests of one analyzer.
///
/// Each analyzer owns its own limiter, so separate analyzers never slow each
/// other down. Concurrent callers on the same limiter queue up in FIFO order.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_permitted: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_permitted: Mutex::new(None),
        }
    }

    /// Waits until the interval since the previous permit has passed, then
    /// records and returns the new permit time. Never fails.
    pub async fn acquire(&self) -> Instant {
        let mut last = self.last_permitted.lock().await;
        if let Some(prev) = *last {
            let ready_at = prev + self.min_interval;
            let now = Instant::now();
            if ready_at > now {
                debug!("Rate limiting: waiting {:?}", ready_at - now);
                sleep_until(ready_at).await;
            }
        }
        let permitted = Instant::now();
        *last = Some(permitted);
        permitted
    }
}
