use std::time::{Duration, Instant};

/// Lets at most one call through per interval. Calls inside the window are
/// dropped, not deferred.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    interval: Duration,
    last_fired: Option<Instant>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
        }
    }

    pub fn try_fire(&mut self, now: Instant) -> bool {
        let ready = match self.last_fired {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        };
        if ready {
            self.last_fired = Some(now);
        }
        ready
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
