//! Public handle for the presence relay connection.

use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::debug;

use super::connection::connection_loop;
use super::types::{ConnectionState, TransportCommand, TransportConfig, TransportEvent};
use crate::protocol::OutboundFrame;

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Handle for the single relay socket.
///
/// All methods are non-blocking and send commands to the background
/// connection task. Dropping every handle shuts the task down.
pub struct TransportClient {
    command_tx: mpsc::Sender<TransportCommand>,
    state: Arc<RwLock<ConnectionState>>,
}

impl TransportClient {
    /// Create a new client and start the background connection.
    /// Returns `(client, event_receiver)`.
    pub fn connect(config: TransportConfig) -> (Self, mpsc::Receiver<TransportEvent>) {
        let (event_tx, event_rx) = mpsc::channel(256);
        let (command_tx, command_rx) = mpsc::channel(64);
        let state = Arc::new(RwLock::new(ConnectionState::Disconnected));

        let client = Self {
            command_tx,
            state: Arc::clone(&state),
        };

        tokio::spawn(connection_loop(config, state, event_tx, command_rx));

        (client, event_rx)
    }

    /// Clone the command sender to create a lightweight handle
    /// that can send commands to the same connection.
    pub fn clone_sender(&self) -> Self {
        Self {
            command_tx: self.command_tx.clone(),
            state: Arc::clone(&self.state),
        }
    }

    /// Queue a frame for the relay. Fire-and-forget: the frame is dropped
    /// if the socket is not open or the queue is full.
    pub fn send(&self, frame: OutboundFrame) {
        if let Err(e) = self.command_tx.try_send(TransportCommand::Send(frame)) {
            debug!(kind = frame.kind(), error = %e, "Frame not queued");
        }
    }

    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// Close the socket and stop reconnecting.
    pub async fn shutdown(&self) {
        let _ = self.command_tx.send(TransportCommand::Shutdown).await;
    }
}
