//! Relay connection settings.

use serde::{Deserialize, Serialize};

/// Default relay host.
pub const DEFAULT_SERVER: &str = "sechat.quickmediasolutions.com";

/// Accepted range for `ping_interval_seconds`.
pub const PING_INTERVAL_RANGE: (u32, u32) = (5, 300);
/// Accepted range for `retry_interval_seconds`.
pub const RETRY_INTERVAL_RANGE: (u32, u32) = (1, 600);
/// Accepted range for `connect_timeout_seconds`.
pub const CONNECT_TIMEOUT_RANGE: (u32, u32) = (1, 120);

/// How to reach the presence relay and how to keep the socket alive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Relay host (and optional port), without scheme.
    pub server: String,
    /// Seconds between keepalive pings while the socket is open.
    pub ping_interval_seconds: u32,
    /// Fixed delay before reconnecting after the socket closes.
    pub retry_interval_seconds: u32,
    /// Give up on a single connect attempt after this many seconds.
    pub connect_timeout_seconds: u32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.into(),
            ping_interval_seconds: 30,
            retry_interval_seconds: 60,
            connect_timeout_seconds: 15,
        }
    }
}

impl ConnectionConfig {
    /// Copy with every interval pulled into its accepted range.
    ///
    /// Loading keeps out-of-range values so validation can report them; the
    /// transport must only ever see clamped ones.
    pub fn clamped(&self) -> Self {
        let clamp = |value: u32, (min, max): (u32, u32)| value.clamp(min, max);
        Self {
            server: self.server.clone(),
            ping_interval_seconds: clamp(self.ping_interval_seconds, PING_INTERVAL_RANGE),
            retry_interval_seconds: clamp(self.retry_interval_seconds, RETRY_INTERVAL_RANGE),
            connect_timeout_seconds: clamp(self.connect_timeout_seconds, CONNECT_TIMEOUT_RANGE),
        }
    }
}
