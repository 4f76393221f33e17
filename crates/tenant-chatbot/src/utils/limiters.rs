use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Sliding-window limiter: at most `max_calls` admissions in any trailing
/// `interval`.
///
/// The whole purge/check/wait/record sequence runs under one lock, so callers
/// sharing a limiter are admitted one at a time.
pub struct RateLimiter {
    max_calls: usize,
    interval: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_calls: usize, interval: Duration) -> Self {
        let max_calls = max_calls.max(1);
        Self {
            max_calls,
            interval,
            calls: Mutex::new(VecDeque::with_capacity(max_calls)),
        }
    }

    /// Limiter with a per-minute quota.
    pub fn per_minute(max_calls: usize) -> Self {
        Self::new(max_calls, Duration::from_secs(60))
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until an admission fits in the window, then record it.
    pub async fn acquire(&self) {
        let mut calls = self.calls.lock().await;

        loop {
            let now = Instant::now();
            while let Some(oldest) = calls.front() {
                if now.duration_since(*oldest) >= self.interval {
                    calls.pop_front();
                } else {
                    break;
                }
            }

            if calls.len() < self.max_calls {
                break;
            }

            // len >= max_calls >= 1, so front() is present
            let Some(oldest) = calls.front().copied() else {
                break;
            };
            let sleep_for = (oldest + self.interval).saturating_duration_since(now);
            debug!("Rate limit reached; sleeping for {:.2}s", sleep_for.as_secs_f64());
            tokio::time::sleep(sleep_for).await;
        }

        calls.push_back(Instant::now());
    }

    /// Admissions still inside the window.
    pub async fn in_flight(&self) -> usize {
        let calls = self.calls.lock().await;
        let now = Instant::now();
        calls
            .iter()
            .filter(|ts| now.duration_since(**ts) < self.interval)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_admits_quota_without_waiting() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let start = Instant::now();

        for _ in 0..3 {
            limiter.acquire().await;
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(limiter.in_flight().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_over_quota_waits_for_window() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;

        assert!(start.elapsed() >= Duration::from_secs(60));
        // the first two admissions expired, only the third is retained
        assert_eq!(limiter.in_flight().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_only_until_oldest_expires() {
        let limiter = RateLimiter::new(2, Duration::from_secs(10));
        let start = Instant::now();

        limiter.acquire().await;
        tokio::time::sleep(Duration::from_secs(4)).await;
        limiter.acquire().await;

        limiter.acquire().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(10));
        assert!(elapsed < Duration::from_secs(14));
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_more_than_quota_in_any_window() {
        let limiter = Arc::new(RateLimiter::new(3, Duration::from_secs(5)));
        let admitted = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let limiter = limiter.clone();
            let admitted = admitted.clone();
            handles.push(tokio::spawn(async move {
                limiter.acquire().await;
                admitted.lock().push(Instant::now());
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut times = admitted.lock().clone();
        times.sort();
        assert_eq!(times.len(), 10);
        for (i, t) in times.iter().enumerate() {
            let in_window = times[i..]
                .iter()
                .filter(|other| other.duration_since(*t) < Duration::from_secs(5))
                .count();
            assert!(in_window <= 3, "window starting at admission {} held {}", i, in_window);
        }
    }

    #[test]
    fn test_zero_quota_is_clamped() {
        let limiter = RateLimiter::per_minute(0);
        assert_eq!(limiter.max_calls(), 1);
        assert_eq!(limiter.interval(), Duration::from_secs(60));
    }
}
