// Fixed-window request counters shared by every request handler

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use tracing::{debug, trace};

/// Hit counter for one key inside its current window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateCounter {
    pub hits: u64,
    /// Unix timestamp (seconds) at which the window closes
    pub reset_at: u64,
}

/// Outcome of a single `check` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u64,
    pub reset_at: u64,
}

/// In-memory fixed-window rate limiter.
///
/// Time is split into windows of `period` seconds aligned on the unix epoch;
/// every request for a key inside one window shares a counter. The limiter is
/// cheap to clone and all clones share the same counters, so one instance is
/// built at startup and handed to the request pipeline through the app state.
///
/// State lives in this process only. Running several processes behind a load
/// balancer gives every process its own quota.
#[derive(Debug, Clone, Default)]
pub struct RateLimiter {
    counters: Arc<DashMap<String, RateCounter>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a hit for `key` against `limit` requests per `period` seconds
    pub fn check(&self, key: &str, limit: u64, period: u64) -> RateLimitDecision {
        self.check_at(key, limit, period, unix_now())
    }

    /// Same as [`RateLimiter::check`] with an explicit clock reading.
    pub fn check_at(&self, key: &str, limit: u64, period: u64, now: u64) -> RateLimitDecision {
        // A zero period would divide by zero; one second is the smallest window
        let period: u64 = period.max(1);
        let window_start: u64 = now / period * period;
        let window_end: u64 = window_start + period;

        self.cleanup(now);

        let counter: RateCounter = {
            let mut entry = self
                .counters
                .entry(key.to_owned())
                .or_insert(RateCounter { hits: 0, reset_at: window_end });

            if entry.reset_at <= now {
                *entry = RateCounter { hits: 0, reset_at: window_end };
            }
            entry.hits += 1;
            *entry
        };

        let allowed: bool = counter.hits <= limit;
        let remaining: u64 = limit.saturating_sub(counter.hits);

        trace!(key, hits = counter.hits, limit, remaining, "rate limit checked");
        if !allowed {
            debug!(key, limit, reset_at = counter.reset_at, "rate limit exceeded");
        }

        RateLimitDecision {
            allowed,
            remaining,
            reset_at: counter.reset_at,
        }
    }

    /// Drops every counter whose window closed at or before `now`
    pub fn cleanup(&self, now: u64) {
        self.counters.retain(|_, counter| counter.reset_at > now);
    }

    /// Current counter for `key`, if one is live
    pub fn counter(&self, key: &str) -> Option<RateCounter> {
        self.counters.get(key).map(|entry| *entry)
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    pub fn clear(&self) {
        self.counters.clear();
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000;

    #[test]
    fn allows_exactly_limit_requests_per_window() {
        let limiter: RateLimiter = RateLimiter::new();

        let remaining: Vec<u64> = (0..10)
            .map(|_| {
                let decision: RateLimitDecision = limiter.check_at("k", 10, 1, NOW);
                assert!(decision.allowed);
                decision.remaining
            })
            .collect();
        assert_eq!(remaining, vec![9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);

        let eleventh: RateLimitDecision = limiter.check_at("k", 10, 1, NOW);
        assert!(!eleventh.allowed);
        assert_eq!(eleventh.remaining, 0);
    }

    #[test]
    fn check_uses_the_system_clock() {
        let limiter: RateLimiter = RateLimiter::new();
        let before: u64 = unix_now();

        let decision: RateLimitDecision = limiter.check("k", 10, 60);

        assert!(decision.allowed);
        assert_eq!(decision.remaining, 9);
        assert!(decision.reset_at > before);
        assert!(decision.reset_at <= before + 61);
    }

    #[test]
    fn window_boundaries_are_floor_aligned() {
        let limiter: RateLimiter = RateLimiter::new();

        let decision: RateLimitDecision = limiter.check_at("k", 5, 60, 125);
        assert_eq!(decision.reset_at, 180);

        // still inside [120, 180)
        let decision: RateLimitDecision = limiter.check_at("k", 5, 60, 179);
        assert_eq!(decision.reset_at, 180);
        assert_eq!(limiter.counter("k").map(|c| c.hits), Some(2));
    }

    #[test]
    fn counter_restarts_after_reset() {
        let limiter: RateLimiter = RateLimiter::new();

        for _ in 0..3 {
            limiter.check_at("k", 2, 10, NOW);
        }
        assert!(!limiter.check_at("k", 2, 10, NOW).allowed);

        let first_reset: u64 = limiter.counter("k").map(|c| c.reset_at).unwrap();
        let decision: RateLimitDecision = limiter.check_at("k", 2, 10, first_reset);

        assert!(decision.allowed);
        assert_eq!(decision.remaining, 1);
        assert_eq!(decision.reset_at, first_reset + 10);
        assert_eq!(limiter.counter("k").map(|c| c.hits), Some(1));
    }

    #[test]
    fn keys_are_counted_independently() {
        let limiter: RateLimiter = RateLimiter::new();

        limiter.check_at("cp/10.0.0.1", 1, 1, NOW);
        let other: RateLimitDecision = limiter.check_at("cp/10.0.0.2", 1, 1, NOW);
        let same: RateLimitDecision = limiter.check_at("cp/10.0.0.1", 1, 1, NOW);

        assert!(other.allowed);
        assert!(!same.allowed);
    }

    #[test]
    fn expired_keys_are_swept_on_any_access() {
        let limiter: RateLimiter = RateLimiter::new();

        for cycle in 0..50u64 {
            limiter.check_at(&format!("client-{cycle}"), 10, 1, NOW + cycle);
        }

        // Only the counter from the latest window survives each sweep
        assert_eq!(limiter.len(), 1);

        limiter.check_at("other", 10, 1, NOW + 100);
        assert!(limiter.counter("client-49").is_none());
        assert_eq!(limiter.len(), 1);
    }

    #[test]
    fn zero_limit_denies_everything() {
        let limiter: RateLimiter = RateLimiter::new();
        let decision: RateLimitDecision = limiter.check_at("k", 0, 1, NOW);

        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
    }

    #[test]
    fn zero_period_behaves_as_one_second() {
        let limiter: RateLimiter = RateLimiter::new();
        let decision: RateLimitDecision = limiter.check_at("k", 1, 0, NOW);

        assert!(decision.allowed);
        assert_eq!(decision.reset_at, NOW + 1);
    }

    #[test]
    fn clones_share_counters() {
        let limiter: RateLimiter = RateLimiter::new();
        let clone: RateLimiter = limiter.clone();

        limiter.check_at("k", 2, 1, NOW);
        clone.check_at("k", 2, 1, NOW);

        assert_eq!(limiter.counter("k").map(|c| c.hits), Some(2));
        clone.clear();
        assert!(limiter.is_empty());
    }

    #[test]
    fn concurrent_hits_are_not_lost() {
        let limiter: RateLimiter = RateLimiter::new();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let limiter: &RateLimiter = &limiter;
                scope.spawn(move || {
                    for _ in 0..25 {
                        limiter.check_at("shared", 1_000, 3600, NOW);
                    }
                });
            }
        });

        assert_eq!(limiter.counter("shared").map(|c| c.hits), Some(200));
    }
}
