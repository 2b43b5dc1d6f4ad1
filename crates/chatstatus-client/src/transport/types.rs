//! Configuration, connection state, and event/command enums for the transport.

use std::time::Duration;

use chatstatus_common::{RoomId, UserId};

use crate::protocol::{InboundFrame, OutboundFrame};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for connecting to the presence relay.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Relay host, without scheme.
    pub server: String,
    /// Room the local user is viewing.
    pub room_id: RoomId,
    /// The local user.
    pub user_id: UserId,
    /// Keepalive interval while the socket is open (default: 30s).
    pub ping_interval: Duration,
    /// Fixed delay between a close and the next connect attempt (default: 60s).
    pub retry_interval: Duration,
    /// A connect attempt that takes longer than this counts as a close.
    pub connect_timeout: Duration,
    /// Use `wss://` (default) or plain `ws://`.
    pub secure: bool,
}

impl TransportConfig {
    pub fn new(server: impl Into<String>, room_id: RoomId, user_id: UserId) -> Self {
        Self {
            server: server.into(),
            room_id,
            user_id,
            ping_interval: Duration::from_secs(30),
            retry_interval: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(15),
            secure: true,
        }
    }

    /// Build the WebSocket URL for this room and user.
    pub fn ws_url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!(
            "{}://{}/api/connect/{}/{}",
            scheme, self.server, self.room_id, self.user_id
        )
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Lifecycle of the single relay socket.
///
/// `Disconnected → Connecting → Open → Closing → Disconnected`. A connect
/// attempt that fails goes straight from `Connecting` back to
/// `Disconnected`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Open,
    Closing,
}

// ---------------------------------------------------------------------------
// Events & Commands
// ---------------------------------------------------------------------------

/// Events emitted by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Socket opened.
    Opened,
    /// A well-formed frame from the relay.
    Frame(InboundFrame),
    /// Socket error. Always followed by `Closed`.
    Error(String),
    /// Socket closed; a reconnect is scheduled.
    Closed,
}

/// Commands sent to the connection task.
#[derive(Debug)]
pub(crate) enum TransportCommand {
    Send(OutboundFrame),
    Shutdown,
}
