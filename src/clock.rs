//! Gravity driver: fixed-interval deadline polled by the app loop.

use std::time::{Duration, Instant};

/// Default gravity interval.
pub const DEFAULT_DROP_INTERVAL_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct GravityClock {
    interval: Duration,
    last_drop: Instant,
}

impl GravityClock {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self { interval, last_drop: now }
    }

    /// True once per elapsed interval; the next interval starts at `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_drop) >= self.interval {
            self.last_drop = now;
            true
        } else {
            false
        }
    }

    /// Time left until the next gravity step is due (zero if overdue).
    pub fn until_next(&self, now: Instant) -> Duration {
        (self.last_drop + self.interval).saturating_duration_since(now)
    }

    /// Starts a fresh interval, e.g. after a restart.
    pub fn reset(&mut self, now: Instant) {
        self.last_drop = now;
    }
}
