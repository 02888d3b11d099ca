//! Sliding one-second-window rate limiter for inbound channel messages.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Tracks timestamps of accepted messages over a trailing one-second window.
/// `None` limit means unlimited - `allow()` always returns `true`.
pub struct RateLimiter {
    limit: Option<u32>,
    window: Duration,
    timestamps: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(limit: Option<u32>) -> Self {
        Self {
            limit: limit.filter(|&l| l > 0),
            window: Duration::from_secs(1),
            timestamps: VecDeque::new(),
        }
    }

    /// Record `now` as an attempt and return whether it should be accepted.
    /// Rejected attempts are not recorded, so a sustained burst above the
    /// limit keeps getting re-evaluated against the sliding window rather
    /// than permanently occupying a slot.
    pub fn allow(&mut self, now: Instant) -> bool {
        let Some(limit) = self.limit else {
            return true;
        };
        while let Some(&front) = self.timestamps.front() {
            if now.duration_since(front) > self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
        if self.timestamps.len() as u32 >= limit {
            return false;
        }
        self.timestamps.push_back(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_always_allows() {
        let mut rl = RateLimiter::new(None);
        let now = Instant::now();
        for _ in 0..1000 {
            assert!(rl.allow(now));
        }
    }

    #[test]
    fn caps_within_window() {
        let mut rl = RateLimiter::new(Some(3));
        let now = Instant::now();
        assert!(rl.allow(now));
        assert!(rl.allow(now));
        assert!(rl.allow(now));
        assert!(!rl.allow(now));
        assert!(!rl.allow(now));
    }

    #[test]
    fn resets_after_window_elapses() {
        let mut rl = RateLimiter::new(Some(2));
        let t0 = Instant::now();
        assert!(rl.allow(t0));
        assert!(rl.allow(t0));
        assert!(!rl.allow(t0));
        let t1 = t0 + Duration::from_millis(1100);
        assert!(rl.allow(t1));
    }
}
