use std::time::Duration;

use tokio::time::Instant;

/// Lets an action through at most once per `interval`, no matter how often
/// it is requested.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_fired: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Throttle {
            interval,
            last_fired: None,
        }
    }

    /// Returns true (and records `now`) when at least `interval` has passed
    /// since the last accepted call
    pub fn try_fire(&mut self, now: Instant) -> bool {
        match self.last_fired {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last_fired = Some(now);
                true
            }
        }
    }

    /// Forget the last accepted call; the next request goes through
    pub fn reset(&mut self) {
        self.last_fired = None;
    }
}
