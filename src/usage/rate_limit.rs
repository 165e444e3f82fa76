use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Slack added to computed waits so the oldest call has certainly left the window.
const WAIT_PADDING: Duration = Duration::from_millis(100);

/// Sliding-window limiter allowing at most `max_calls` within any `window`.
///
/// A `max_calls` of zero disables limiting entirely.
pub struct RateLimiter {
    max_calls: usize,
    window: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Build a limiter for `max_calls` per `window`.
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self {
            max_calls,
            window,
            calls: Mutex::new(VecDeque::with_capacity(max_calls)),
        }
    }

    /// Convenience constructor for per-minute quotas.
    pub fn per_minute(max_calls: usize) -> Self {
        Self::new(max_calls, Duration::from_secs(60))
    }

    /// Record a call and return `true` when the budget allows it, `false` otherwise.
    pub async fn allow_request(&self) -> bool {
        if self.max_calls == 0 {
            return true;
        }
        let now = Instant::now();
        let mut calls = self.calls.lock().await;
        self.prune(&mut calls, now);
        if calls.len() < self.max_calls {
            calls.push_back(now);
            true
        } else {
            false
        }
    }

    /// Block until a call slot is available, then record the call.
    ///
    /// The lock is released while sleeping so other tasks can inspect the limiter.
    pub async fn wait_if_needed(&self) {
        if self.max_calls == 0 {
            return;
        }
        loop {
            let wait = {
                let now = Instant::now();
                let mut calls = self.calls.lock().await;
                self.prune(&mut calls, now);
                if calls.len() < self.max_calls {
                    calls.push_back(now);
                    return;
                }
                match calls.front() {
                    Some(oldest) => {
                        self.window.saturating_sub(now.duration_since(*oldest)) + WAIT_PADDING
                    }
                    None => WAIT_PADDING,
                }
            };
            tracing::info!(
                wait_ms = wait.as_millis() as u64,
                max_calls = self.max_calls,
                "Rate limit reached; waiting for a free slot"
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Calls still available in the current window.
    pub async fn remaining_calls(&self) -> usize {
        if self.max_calls == 0 {
            return usize::MAX;
        }
        let mut calls = self.calls.lock().await;
        self.prune(&mut calls, Instant::now());
        self.max_calls.saturating_sub(calls.len())
    }

    /// Time until the oldest recorded call leaves the window.
    pub async fn reset_time(&self) -> Duration {
        let now = Instant::now();
        let mut calls = self.calls.lock().await;
        self.prune(&mut calls, now);
        calls
            .front()
            .map(|oldest| self.window.saturating_sub(now.duration_since(*oldest)))
            .unwrap_or(Duration::ZERO)
    }

    fn prune(&self, calls: &mut VecDeque<Instant>, now: Instant) {
        while let Some(oldest) = calls.front() {
            if now.duration_since(*oldest) >= self.window {
                calls.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn rejects_calls_beyond_budget_until_window_slides() {
        let limiter = RateLimiter::new(2, Duration::from_secs(10));
        assert!(limiter.allow_request().await);
        assert!(limiter.allow_request().await);
        assert!(!limiter.allow_request().await);
        assert_eq!(limiter.remaining_calls().await, 0);

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(limiter.remaining_calls().await, 2);
        assert!(limiter.allow_request().await);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_if_needed_sleeps_until_oldest_call_expires() {
        let limiter = RateLimiter::new(1, Duration::from_secs(5));
        limiter.wait_if_needed().await;

        let started = Instant::now();
        limiter.wait_if_needed().await;
        let waited = started.elapsed();

        assert!(waited >= Duration::from_secs(5));
        assert!(waited < Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_time_tracks_oldest_call() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        assert_eq!(limiter.reset_time().await, Duration::ZERO);
        limiter.allow_request().await;
        tokio::time::advance(Duration::from_secs(20)).await;
        assert_eq!(limiter.reset_time().await, Duration::from_secs(40));
    }

    #[tokio::test]
    async fn zero_budget_means_unlimited() {
        let limiter = RateLimiter::per_minute(0);
        for _ in 0..100 {
            assert!(limiter.allow_request().await);
        }
        limiter.wait_if_needed().await;
    }
}
