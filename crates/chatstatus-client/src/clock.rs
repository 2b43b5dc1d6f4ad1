//! Time sources for the presence engine.
//!
//! Presence logic never reads the system clock directly; it asks a
//! [`Clock`]. Production code uses [`SystemClock`], tests drive a manual
//! clock so timer behavior is deterministic.

use std::time::Instant;

/// Monotonic time plus wall-clock unix seconds.
///
/// Implementations must never return a decreasing `now()`.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Current monotonic time, used for timers and throttles.
    fn now(&self) -> Instant;

    /// Current unix timestamp in whole seconds, used on the wire.
    fn unix_time(&self) -> i64;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn unix_time(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

#[cfg(test)]
pub(crate) use manual::ManualClock;
