//! A running presence session: one transport, one controller, one
//! dispatcher task.

mod dispatcher;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

pub use dispatcher::FrameSink;

use crate::clock::{Clock, SystemClock};
use crate::controller::{ControllerConfig, LocalSignal, PresenceController};
use crate::presence::PresenceChange;
use crate::transport::{TransportClient, TransportConfig, TransportEvent};
use dispatcher::dispatch_loop;

/// Handle to a running session.
///
/// Local collaborators feed it [`LocalSignal`]s; the renderer reads
/// [`PresenceChange`]s from the receiver returned by [`start`](Self::start).
pub struct PresenceSession {
    signal_tx: mpsc::Sender<LocalSignal>,
    transport: Option<TransportClient>,
    task: JoinHandle<()>,
}

impl PresenceSession {
    /// Connect to the relay and start dispatching.
    pub fn start(
        transport: TransportConfig,
        controller: ControllerConfig,
    ) -> (Self, mpsc::Receiver<PresenceChange>) {
        let (client, events) = TransportClient::connect(transport);
        let sink = client.clone_sender();
        let controller = PresenceController::new(controller, SystemClock);
        let (mut session, changes) = Self::spawn(controller, sink, events);
        session.transport = Some(client);
        (session, changes)
    }

    /// Run a controller against any frame sink and event source.
    pub fn spawn<C: Clock, S: FrameSink>(
        controller: PresenceController<C>,
        sink: S,
        events: mpsc::Receiver<TransportEvent>,
    ) -> (Self, mpsc::Receiver<PresenceChange>) {
        let (signal_tx, signal_rx) = mpsc::channel(64);
        let (change_tx, change_rx) = mpsc::channel(256);
        let task = tokio::spawn(dispatch_loop(
            controller, sink, events, signal_rx, change_tx,
        ));
        let session = Self {
            signal_tx,
            transport: None,
            task,
        };
        (session, change_rx)
    }

    /// Deliver a local signal to the dispatcher.
    pub async fn signal(&self, signal: LocalSignal) {
        if self.signal_tx.send(signal).await.is_err() {
            warn!("Presence session has ended; signal dropped");
        }
    }

    /// Close the relay socket and wait for the dispatcher to finish.
    pub async fn shutdown(self) {
        let Self {
            signal_tx,
            transport,
            task,
        } = self;
        if let Some(transport) = transport {
            transport.shutdown().await;
        }
        drop(signal_tx);
        if let Err(e) = task.await {
            warn!(error = %e, "Presence dispatcher ended abnormally");
        }
    }
}
