//! Fixed-window rate limiting.
//!
//! [`FixedWindowLimiter`] keeps a process-local counter per client key. The
//! table has no durability guarantee and resets on restart -- acceptable for
//! abuse mitigation, not for billing-grade quotas. The API layer exposes it
//! behind a trait so a shared external counter (e.g. a key-value store with
//! expiry) can be swapped in without changing callers.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use rand::Rng;

/// Fraction of `check` calls that opportunistically sweep expired windows.
const SWEEP_PROBABILITY: f64 = 0.01;

/// Request budget for one class of endpoint.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window length.
    pub window: Duration,
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Seconds until the window resets. Set only on denial, always >= 1.
    pub retry_after_secs: Option<u64>,
}

impl RateLimitDecision {
    fn allowed() -> Self {
        Self {
            allowed: true,
            retry_after_secs: None,
        }
    }

    fn denied(retry_after_secs: u64) -> Self {
        Self {
            allowed: false,
            retry_after_secs: Some(retry_after_secs.max(1)),
        }
    }
}

/// One client's counter for the current window.
#[derive(Debug)]
struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

/// In-memory fixed-window counter keyed by client identity.
///
/// Increments are atomic per key: the whole table sits behind one mutex,
/// which is held only for the map operation -- never across I/O.
#[derive(Debug, Default)]
pub struct FixedWindowLimiter {
    entries: Mutex<HashMap<String, WindowEntry>>,
}

impl FixedWindowLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check and count a request for `key` under `policy`.
    ///
    /// The first request per key (or the first after the stored window
    /// expired) starts a fresh window. Once `max_requests` is reached, the
    /// request is denied with the seconds remaining until the window resets.
    pub fn check(&self, key: &str, policy: RateLimitPolicy) -> RateLimitDecision {
        let sweep = rand::rng().random_bool(SWEEP_PROBABILITY);
        self.check_at(key, policy, Instant::now(), sweep)
    }

    /// Clock- and sweep-injectable implementation of [`check`](Self::check).
    fn check_at(
        &self,
        key: &str,
        policy: RateLimitPolicy,
        now: Instant,
        sweep: bool,
    ) -> RateLimitDecision {
        let mut entries = self.entries.lock().expect("rate limit mutex poisoned");

        if sweep {
            entries.retain(|_, e| e.reset_at > now);
        }

        match entries.get_mut(key) {
            Some(entry) if entry.reset_at > now => {
                if entry.count < policy.max_requests {
                    entry.count += 1;
                    RateLimitDecision::allowed()
                } else {
                    let remaining = entry.reset_at.duration_since(now);
                    RateLimitDecision::denied(remaining.as_secs_f64().ceil() as u64)
                }
            }
            _ => {
                entries.insert(
                    key.to_string(),
                    WindowEntry {
                        count: 1,
                        reset_at: now + policy.window,
                    },
                );
                RateLimitDecision::allowed()
            }
        }
    }

    /// Number of live (non-expired) keys. Used by tests and diagnostics.
    pub fn tracked_keys(&self) -> usize {
        self.entries.lock().expect("rate limit mutex poisoned").len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: RateLimitPolicy = RateLimitPolicy {
        max_requests: 3,
        window: Duration::from_secs(60),
    };

    #[test]
    fn allows_up_to_max_requests_within_window() {
        let limiter = FixedWindowLimiter::new();
        let now = Instant::now();
        for _ in 0..POLICY.max_requests {
            assert!(limiter.check_at("1.2.3.4", POLICY, now, false).allowed);
        }
    }

    #[test]
    fn denies_the_request_after_max_with_positive_retry_after() {
        let limiter = FixedWindowLimiter::new();
        let now = Instant::now();
        for _ in 0..POLICY.max_requests {
            limiter.check_at("1.2.3.4", POLICY, now, false);
        }
        let decision = limiter.check_at("1.2.3.4", POLICY, now, false);
        assert!(!decision.allowed);
        let retry_after = decision.retry_after_secs.unwrap();
        assert!(retry_after >= 1 && retry_after <= 60, "got {retry_after}");
    }

    #[test]
    fn window_expiry_resets_the_counter() {
        let limiter = FixedWindowLimiter::new();
        let now = Instant::now();
        for _ in 0..=POLICY.max_requests {
            limiter.check_at("1.2.3.4", POLICY, now, false);
        }
        let later = now + POLICY.window + Duration::from_secs(1);
        assert!(limiter.check_at("1.2.3.4", POLICY, later, false).allowed);
    }

    #[test]
    fn keys_are_counted_independently() {
        let limiter = FixedWindowLimiter::new();
        let now = Instant::now();
        for _ in 0..POLICY.max_requests {
            limiter.check_at("1.2.3.4", POLICY, now, false);
        }
        assert!(!limiter.check_at("1.2.3.4", POLICY, now, false).allowed);
        assert!(limiter.check_at("5.6.7.8", POLICY, now, false).allowed);
    }

    #[test]
    fn retry_after_is_near_the_full_window_right_after_exhaustion() {
        let limiter = FixedWindowLimiter::new();
        let now = Instant::now();
        for _ in 0..POLICY.max_requests {
            limiter.check_at("k", POLICY, now, false);
        }
        let decision = limiter.check_at("k", POLICY, now, false);
        assert_eq!(decision.retry_after_secs, Some(60));
    }

    #[test]
    fn sweep_drops_expired_windows() {
        let limiter = FixedWindowLimiter::new();
        let now = Instant::now();
        limiter.check_at("old", POLICY, now, false);
        let later = now + POLICY.window + Duration::from_secs(1);
        limiter.check_at("new", POLICY, later, true);
        assert_eq!(limiter.tracked_keys(), 1);
    }
}
