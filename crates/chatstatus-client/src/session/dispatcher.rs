//! The single loop that owns a session's controller.

use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::controller::{ControllerAction, LocalSignal, PresenceController};
use crate::presence::PresenceChange;
use crate::protocol::OutboundFrame;
use crate::transport::{TransportClient, TransportEvent};

/// Where the dispatcher hands outbound frames. Must not block.
pub trait FrameSink: Send + 'static {
    fn send_frame(&self, frame: OutboundFrame);
}

impl FrameSink for TransportClient {
    fn send_frame(&self, frame: OutboundFrame) {
        self.send(frame);
    }
}

// ---------------------------------------------------------------------------
// Dispatch Loop
// ---------------------------------------------------------------------------

/// Consume transport events, local signals, and timer deadlines one at a
/// time until either input channel closes.
pub(crate) async fn dispatch_loop<C: Clock, S: FrameSink>(
    mut controller: PresenceController<C>,
    sink: S,
    mut events: mpsc::Receiver<TransportEvent>,
    mut signals: mpsc::Receiver<LocalSignal>,
    change_tx: mpsc::Sender<PresenceChange>,
) {
    loop {
        let deadline = controller.next_deadline();

        let actions = tokio::select! {
            event = events.recv() => match event {
                Some(event) => controller.on_transport(event),
                None => {
                    info!("Transport stopped, ending presence session");
                    break;
                }
            },
            signal = signals.recv() => match signal {
                Some(signal) => controller.on_local(signal),
                None => {
                    info!("Signal channel closed, ending presence session");
                    break;
                }
            },
            _ = sleep_until(deadline) => controller.on_tick(),
        };

        for action in actions {
            match action {
                ControllerAction::Send(frame) => sink.send_frame(frame),
                ControllerAction::Notify(change) => {
                    if change_tx.send(change).await.is_err() {
                        debug!("Change receiver dropped");
                    }
                }
            }
        }
    }
}

/// Sleep until `deadline`, or forever if there is none.
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use chatstatus_common::{MessageId, UserId};

    use super::*;
    use crate::clock::ManualClock;
    use crate::controller::{ControllerConfig, FeedMessage};
    use crate::protocol::InboundFrame;

    #[derive(Clone, Default)]
    struct RecordingSink(Arc<Mutex<Vec<OutboundFrame>>>);

    impl FrameSink for RecordingSink {
        fn send_frame(&self, frame: OutboundFrame) {
            self.0.lock().unwrap().push(frame);
        }
    }

    impl RecordingSink {
        fn frames(&self) -> Vec<OutboundFrame> {
            self.0.lock().unwrap().clone()
        }
    }

    struct Harness {
        events: mpsc::Sender<TransportEvent>,
        signals: mpsc::Sender<LocalSignal>,
        changes: mpsc::Receiver<PresenceChange>,
        sink: RecordingSink,
        task: tokio::task::JoinHandle<()>,
    }

    fn start() -> Harness {
        let clock = ManualClock::new(1_450_000_000);
        let controller =
            PresenceController::new(ControllerConfig::new(UserId::new("me"), "relay"), clock);
        let (events, events_rx) = mpsc::channel(16);
        let (signals, signals_rx) = mpsc::channel(16);
        let (change_tx, changes) = mpsc::channel(16);
        let sink = RecordingSink::default();
        let task = tokio::spawn(dispatch_loop(
            controller,
            sink.clone(),
            events_rx,
            signals_rx,
            change_tx,
        ));
        Harness {
            events,
            signals,
            changes,
            sink,
            task,
        }
    }

    async fn next_change(h: &mut Harness) -> PresenceChange {
        tokio::time::timeout(Duration::from_secs(1), h.changes.recv())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn open_resyncs_through_sink() {
        let mut h = start();
        h.events.send(TransportEvent::Opened).await.unwrap();

        assert_eq!(
            next_change(&mut h).await,
            PresenceChange::Connection { open: true }
        );
        assert_eq!(h.sink.frames(), vec![OutboundFrame::Active(true)]);
    }

    #[tokio::test]
    async fn interleaved_sources_place_pending_reader() {
        let mut h = start();
        h.events.send(TransportEvent::Opened).await.unwrap();
        next_change(&mut h).await;

        h.events
            .send(TransportEvent::Frame(InboundFrame::Position {
                user_id: UserId::new("42"),
                message_id: MessageId(5),
            }))
            .await
            .unwrap();
        assert!(matches!(
            next_change(&mut h).await,
            PresenceChange::Active { .. }
        ));
        assert!(matches!(
            next_change(&mut h).await,
            PresenceChange::PositionPending { .. }
        ));

        h.signals
            .send(LocalSignal::MessageAdded(FeedMessage::new(
                MessageId(5),
                UserId::new("7"),
            )))
            .await
            .unwrap();
        assert_eq!(
            next_change(&mut h).await,
            PresenceChange::Position {
                user_id: UserId::new("42"),
                message_id: MessageId(5),
            }
        );
    }

    #[tokio::test]
    async fn loop_ends_when_transport_stops() {
        let h = start();
        drop(h.events);
        tokio::time::timeout(Duration::from_secs(1), h.task)
            .await
            .unwrap()
            .unwrap();
    }
}
