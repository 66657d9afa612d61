//! Rolling-window rate limiting for tracker API calls.
//!
//! The tracker allows a fixed number of calls per window. [`RateLimiter`]
//! remembers when the most recent calls were made and, once the window is
//! full, sleeps until the oldest call falls out of it. Callers never get an
//! error from the limiter; they just wait.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use ggn_core::client::RateLimiter;
//!
//! # async fn example() {
//! let limiter = RateLimiter::new(5, Duration::from_secs(10));
//!
//! // The first five calls proceed immediately, the sixth waits.
//! for _ in 0..6 {
//!     limiter.acquire().await;
//! }
//! # }
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

use super::constants::{RATE_LIMIT_CALLS, RATE_LIMIT_PERIOD};

/// Limits calls to `max_calls` per rolling `period`.
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    period: Duration,
    disabled: bool,
    /// Start times of the calls still inside the window, oldest first.
    recent: Mutex<VecDeque<Instant>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RATE_LIMIT_CALLS, RATE_LIMIT_PERIOD)
    }
}

impl RateLimiter {
    /// Creates a limiter allowing `max_calls` per `period`.
    ///
    /// A `max_calls` of zero is treated as one so the limiter can always make progress.
    #[must_use]
    #[instrument(skip_all, fields(period_ms = period.as_millis()))]
    pub fn new(max_calls: usize, period: Duration) -> Self {
        let max_calls = max_calls.max(1);
        debug!(max_calls, "creating rate limiter");
        Self {
            max_calls,
            period,
            disabled: false,
            recent: Mutex::new(VecDeque::with_capacity(max_calls)),
        }
    }

    /// Creates a limiter that never waits.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            max_calls: usize::MAX,
            period: Duration::ZERO,
            disabled: true,
            recent: Mutex::new(VecDeque::new()),
        }
    }

    /// Returns whether rate limiting is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Waits until another call fits in the window, then records it.
    pub async fn acquire(&self) {
        if self.disabled {
            return;
        }

        let mut recent = self.recent.lock().await;
        loop {
            let now = Instant::now();
            while recent
                .front()
                .is_some_and(|started| now.duration_since(*started) >= self.period)
            {
                recent.pop_front();
            }

            if recent.len() < self.max_calls {
                recent.push_back(now);
                return;
            }

            // Window is full; `front` is Some because len >= max_calls >= 1.
            let Some(oldest) = recent.front().copied() else {
                continue;
            };
            let delay = (oldest + self.period).saturating_duration_since(now);
            debug!(delay_ms = delay.as_millis(), "rate limit reached, waiting");
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_calls_under_limit_do_not_wait() {
        tokio::time::pause();
        let limiter = RateLimiter::new(5, Duration::from_secs(10));
        let start = Instant::now();

        for _ in 0..5 {
            limiter.acquire().await;
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_call_over_limit_waits_for_window() {
        tokio::time::pause();
        let limiter = RateLimiter::new(5, Duration::from_secs(10));
        let start = Instant::now();

        for _ in 0..6 {
            limiter.acquire().await;
        }

        assert!(
            start.elapsed() >= Duration::from_secs(10),
            "sixth call should wait a full window, waited {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn test_window_slides_with_spaced_calls() {
        tokio::time::pause();
        let limiter = RateLimiter::new(2, Duration::from_secs(10));
        let start = Instant::now();

        limiter.acquire().await;
        tokio::time::advance(Duration::from_secs(6)).await;
        limiter.acquire().await;
        // Third call only needs the first one (t=0) to expire at t=10.
        limiter.acquire().await;

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(10), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(16), "elapsed {elapsed:?}");
    }

    #[tokio::test]
    async fn test_disabled_limiter_never_waits() {
        tokio::time::pause();
        let limiter = RateLimiter::disabled();
        let start = Instant::now();

        for _ in 0..50 {
            limiter.acquire().await;
        }

        assert!(limiter.is_disabled());
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_default_allows_five_calls_without_runtime_setup() {
        let limiter = RateLimiter::default();
        tokio_test::block_on(async {
            for _ in 0..5 {
                limiter.acquire().await;
            }
        });
        assert_eq!(limiter.max_calls, 5);
    }

    #[test]
    fn test_zero_calls_clamped_to_one() {
        let limiter = RateLimiter::new(0, Duration::from_secs(1));
        assert_eq!(limiter.max_calls, 1);
        assert!(!limiter.is_disabled());
    }
}
