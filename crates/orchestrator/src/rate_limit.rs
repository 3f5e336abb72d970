//! Sliding-window rate limiter for outbound data-provider calls.
//!
//! At most `max_calls` acquisitions per rolling `window`. A caller over
//! budget sleeps until the oldest call ages out of the window and then
//! re-attempts acquisition; there is no queue-position guarantee across
//! waiters.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

pub struct SlidingWindowLimiter {
    max_calls: usize,
    window: Duration,
    timestamps: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    #[must_use]
    pub fn new(max_calls: u32, window: Duration) -> Self {
        Self {
            max_calls: max_calls.max(1) as usize,
            window,
            timestamps: Mutex::new(VecDeque::new()),
        }
    }

    /// Waits until a call slot is free, then claims it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut timestamps = self.timestamps.lock().await;
                let now = Instant::now();
                while timestamps
                    .front()
                    .is_some_and(|&t| now.duration_since(t) >= self.window)
                {
                    timestamps.pop_front();
                }
                if timestamps.len() < self.max_calls {
                    timestamps.push_back(now);
                    return;
                }
                // Oldest in-window call decides how long until a slot frees.
                let oldest = timestamps[0];
                self.window.saturating_sub(now.duration_since(oldest))
            };
            trace!(?wait, "Rate budget exhausted, sleeping");
            tokio::time::sleep(wait).await;
        }
    }
}
