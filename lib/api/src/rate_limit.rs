//! In-memory sliding window rate limiting, keyed by client address.

use ahash::AHashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const DEFAULT_MAX_REQUESTS: u32 = 30;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Idle clients are dropped once the table grows past this many keys,
/// at most once per window.
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: DEFAULT_MAX_REQUESTS,
            window: DEFAULT_WINDOW,
        }
    }
}

impl RateLimitConfig {
    /// Human-readable limit, e.g. "30 per 60 seconds"
    pub fn describe(&self) -> String {
        format!("{} per {} seconds", self.max_requests, self.window.as_secs())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

#[derive(Debug)]
struct Windows {
    clients: AHashMap<String, VecDeque<Instant>>,
    last_prune: Instant,
}

impl Windows {
    fn prune(&mut self, now: Instant, window: Duration) {
        if self.clients.len() <= PRUNE_THRESHOLD
            || now.saturating_duration_since(self.last_prune) < window
        {
            return;
        }
        self.clients.retain(|_, stamps| {
            stamps
                .back()
                .map_or(false, |last| now.saturating_duration_since(*last) < window)
        });
        self.last_prune = now;
    }
}

/// Tracks request timestamps per key over the configured window.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Mutex<Windows>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(Windows {
                clients: AHashMap::new(),
                last_prune: Instant::now(),
            }),
        }
    }

    /// Number of clients currently holding a window
    pub fn tracked_clients(&self) -> usize {
        self.windows.lock().clients.len()
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now())
    }

    /// Record a request for `key` at `now` if it fits in the window.
    pub fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        if !self.config.enabled {
            return RateLimitDecision::Allowed {
                remaining: self.config.max_requests,
            };
        }

        let window = self.config.window;
        let max = self.config.max_requests as usize;
        let mut windows = self.windows.lock();
        windows.prune(now, window);

        let stamps = windows.clients.entry(key.to_string()).or_default();
        while let Some(oldest) = stamps.front() {
            if now.saturating_duration_since(*oldest) >= window {
                stamps.pop_front();
            } else {
                break;
            }
        }

        if stamps.len() >= max {
            let retry_after = stamps
                .front()
                .map(|oldest| window.saturating_sub(now.saturating_duration_since(*oldest)))
                .unwrap_or(window);
            return RateLimitDecision::Limited { retry_after };
        }

        stamps.push_back(now);
        RateLimitDecision::Allowed {
            remaining: (max - stamps.len()) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            enabled: true,
            max_requests,
            window: Duration::from_secs(window_secs),
        })
    }

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = limiter(3, 60);
        let now = Instant::now();
        assert_eq!(limiter.check_at("a", now), RateLimitDecision::Allowed { remaining: 2 });
        assert_eq!(limiter.check_at("a", now), RateLimitDecision::Allowed { remaining: 1 });
        assert_eq!(limiter.check_at("a", now), RateLimitDecision::Allowed { remaining: 0 });
        assert!(!limiter.check_at("a", now).is_allowed());
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = limiter(1, 60);
        let now = Instant::now();
        assert!(limiter.check_at("a", now).is_allowed());
        assert!(limiter.check_at("b", now).is_allowed());
        assert!(!limiter.check_at("a", now).is_allowed());
    }

    #[test]
    fn test_window_slides() {
        let limiter = limiter(2, 10);
        let start = Instant::now();
        assert!(limiter.check_at("a", start).is_allowed());
        assert!(limiter.check_at("a", start + Duration::from_secs(5)).is_allowed());

        match limiter.check_at("a", start + Duration::from_secs(6)) {
            RateLimitDecision::Limited { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(4));
            }
            other => panic!("expected limit, got {:?}", other),
        }

        // The first request has aged out.
        assert!(limiter.check_at("a", start + Duration::from_secs(10)).is_allowed());
    }

    #[test]
    fn test_idle_clients_pruned_once_per_window() {
        let limiter = limiter(5, 10);
        let start = Instant::now();
        for i in 0..=PRUNE_THRESHOLD {
            limiter.check_at(&format!("client-{}", i), start);
        }
        assert_eq!(limiter.tracked_clients(), PRUNE_THRESHOLD + 1);

        // Still inside the window: nothing is idle yet.
        limiter.check_at("late", start + Duration::from_secs(5));
        assert_eq!(limiter.tracked_clients(), PRUNE_THRESHOLD + 2);

        limiter.check_at("fresh", start + Duration::from_secs(11));
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn test_disabled_always_allows() {
        let limiter = RateLimiter::new(RateLimitConfig {
            enabled: false,
            max_requests: 1,
            window: Duration::from_secs(60),
        });
        let now = Instant::now();
        for _ in 0..10 {
            assert!(limiter.check_at("a", now).is_allowed());
        }
    }
}
