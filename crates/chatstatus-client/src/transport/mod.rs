//! WebSocket transport to the presence relay.
//!
//! A single background task owns the socket. It sends a keepalive ping
//! every `ping_interval` while open, surfaces every close, and reconnects
//! after a fixed `retry_interval`. Frames sent while the socket is not open
//! are dropped.

mod client;
mod connection;
mod handler;
mod state;
mod types;

pub use client::TransportClient;
pub use state::ConnectionMachine;
pub use types::{ConnectionState, TransportConfig, TransportEvent};
