//! Connection bookkeeping, free of I/O.
//!
//! [`ConnectionMachine`] decides when to connect, ping, and reconnect. The
//! async connection loop feeds it socket outcomes and the current time and
//! does whatever it says. Keepalive and reconnect deadlines are never armed
//! at the same time.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::types::ConnectionState;
use crate::protocol::OutboundFrame;

/// Shortest ping or retry interval the machine accepts. Anything shorter is
/// raised to this.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct ConnectionMachine {
    state: ConnectionState,
    ping_interval: Duration,
    retry_interval: Duration,
    next_ping: Option<Instant>,
    reconnect_at: Option<Instant>,
}

impl ConnectionMachine {
    pub fn new(ping_interval: Duration, retry_interval: Duration) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            ping_interval: ping_interval.max(MIN_INTERVAL),
            retry_interval: retry_interval.max(MIN_INTERVAL),
            next_ping: None,
            reconnect_at: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Begin a connect attempt. Returns `false` (and does nothing) while a
    /// socket is already connecting, open, or closing.
    pub fn connect(&mut self) -> bool {
        if self.state != ConnectionState::Disconnected {
            return false;
        }
        self.state = ConnectionState::Connecting;
        self.reconnect_at = None;
        true
    }

    /// The socket opened. Replaces any previous keepalive schedule.
    pub fn on_open(&mut self, now: Instant) {
        self.state = ConnectionState::Open;
        self.reconnect_at = None;
        self.next_ping = Some(now + self.ping_interval);
    }

    /// Socket errors are only logged; the close that follows drives the
    /// reconnect.
    pub fn on_error(&self, error: &str) {
        warn!(state = ?self.state, error = %error, "Relay socket error");
    }

    /// We are closing the socket ourselves.
    pub fn begin_close(&mut self) {
        if matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::Open
        ) {
            self.state = ConnectionState::Closing;
        }
        self.next_ping = None;
    }

    /// The socket closed, normally or not, or a connect attempt failed.
    ///
    /// Stops the keepalive and schedules one reconnect. Returns `false` if a
    /// reconnect was already scheduled.
    pub fn on_close(&mut self, now: Instant) -> bool {
        self.state = ConnectionState::Disconnected;
        self.next_ping = None;
        if self.reconnect_at.is_some() {
            return false;
        }
        self.reconnect_at = Some(now + self.retry_interval);
        true
    }

    /// Encode a frame if the socket is open. Frames sent at any other time
    /// are dropped.
    pub fn prepare_send(&self, frame: &OutboundFrame) -> Option<String> {
        if self.state != ConnectionState::Open {
            debug!(kind = frame.kind(), state = ?self.state, "Dropping frame, socket not open");
            return None;
        }
        match frame.to_json() {
            Ok(json) => Some(json),
            Err(e) => {
                warn!(kind = frame.kind(), error = %e, "Failed to encode frame");
                None
            }
        }
    }

    /// Returns a ping if one is due at `now` and schedules the next one.
    pub fn poll_ping(&mut self, now: Instant) -> Option<OutboundFrame> {
        if self.state != ConnectionState::Open {
            return None;
        }
        match self.next_ping {
            Some(at) if at <= now => {
                self.next_ping = Some(now + self.ping_interval);
                Some(OutboundFrame::Ping)
            }
            _ => None,
        }
    }

    pub fn next_ping(&self) -> Option<Instant> {
        self.next_ping
    }

    pub fn retry_interval(&self) -> Duration {
        self.retry_interval
    }

    pub fn reconnect_at(&self) -> Option<Instant> {
        self.reconnect_at
    }

    pub fn reconnect_due(&self, now: Instant) -> bool {
        self.state == ConnectionState::Disconnected
            && self.reconnect_at.is_some_and(|at| at <= now)
    }
}
