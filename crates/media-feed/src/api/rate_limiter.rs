//! Client-side request throttling.
//!
//! Enforces both a minimum spacing between requests and a sliding
//! one-minute budget, so the four dashboard queries fired together do not
//! trip the catalog's own limiter.

use shared::config::RateLimitConfig;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::time::sleep;

const WINDOW: Duration = Duration::from_secs(60);

/// Rate limiter with dual constraints (per-second and per-minute)
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum spacing between two requests
    min_interval: Duration,
    /// Maximum requests per sliding minute
    max_per_minute: usize,
    /// Last request timestamp
    last_request: Option<Instant>,
    /// Request timestamps inside the current window, oldest first
    window: VecDeque<Instant>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(max_per_second: f64, max_per_minute: u32) -> Self {
        let min_interval = if max_per_second > 0.0 {
            Duration::try_from_secs_f64(1.0 / max_per_second).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        };
        let max_per_minute = (max_per_minute as usize).max(1);

        Self {
            min_interval,
            max_per_minute,
            last_request: None,
            window: VecDeque::with_capacity(max_per_minute),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.requests_per_second, config.requests_per_minute)
    }

    /// Wait until a request can be made, respecting both rate limits
    pub async fn acquire(&mut self) {
        let now = Instant::now();
        self.evict(now);

        if self.window.len() >= self.max_per_minute {
            if let Some(&oldest) = self.window.front() {
                let wait_time = WINDOW.saturating_sub(now.duration_since(oldest));
                if !wait_time.is_zero() {
                    tracing::debug!(
                        wait_ms = wait_time.as_millis(),
                        "Rate limit: waiting for per-minute budget"
                    );
                    sleep(wait_time).await;
                }
            }
        }

        if let Some(last) = self.last_request {
            let wait_time = self.min_interval.saturating_sub(last.elapsed());
            if !wait_time.is_zero() {
                tracing::debug!(
                    wait_ms = wait_time.as_millis(),
                    "Rate limit: waiting for request spacing"
                );
                sleep(wait_time).await;
            }
        }

        let request_time = Instant::now();
        self.evict(request_time);
        self.last_request = Some(request_time);
        self.window.push_back(request_time);
    }

    /// Number of requests made in the last minute
    pub fn current_minute_count(&mut self) -> usize {
        self.evict(Instant::now());
        self.window.len()
    }

    fn evict(&mut self, now: Instant) {
        while let Some(&oldest) = self.window.front() {
            if now.duration_since(oldest) < WINDOW {
                break;
            }
            self.window.pop_front();
        }
    }
}
