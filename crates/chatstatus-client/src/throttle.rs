//! Pure time-based rate limiters.

use std::time::{Duration, Instant};

/// Lets an action through at most once per `interval`.
///
/// The first call always passes. Calls inside the window are rejected
/// without extending it.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Returns `true` and starts a new window if the previous window has
    /// elapsed at `now`.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Forget the current window so the next call passes.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Gate that opens exactly once.
#[derive(Debug, Clone, Default)]
pub struct RunOnce {
    done: bool,
}

impl RunOnce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time only.
    pub fn run(&mut self) -> bool {
        !std::mem::replace(&mut self.done, true)
    }
}
