//! Incoming text frame handling.

use chatstatus_common::ChatStatusError;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::types::TransportEvent;
use crate::protocol::{FrameError, InboundFrame};

/// Parse one text frame and forward it as a [`TransportEvent`].
///
/// Keepalive echoes are swallowed. Bad frames are logged and dropped; they
/// never end the connection.
pub(crate) async fn handle_text_frame(text: &str, event_tx: &mpsc::Sender<TransportEvent>) {
    match InboundFrame::parse(text) {
        Ok(InboundFrame::Keepalive) => {}
        Ok(frame) => {
            debug!(frame = ?frame, "Frame received");
            let _ = event_tx.send(TransportEvent::Frame(frame)).await;
        }
        Err(FrameError::UnknownType(kind)) => {
            debug!(kind = %kind, "Ignoring unrecognized frame type");
        }
        Err(e) => {
            let err = ChatStatusError::from(e);
            warn!(error = %err, text = %text, "Dropping malformed frame");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatstatus_common::{MessageId, UserId};

    #[tokio::test]
    async fn bad_frame_does_not_stop_later_frames() {
        let (tx, mut rx) = mpsc::channel(8);

        handle_text_frame("{garbage", &tx).await;
        handle_text_frame("", &tx).await;
        handle_text_frame(r#"{"type":"confetti","user_id":"1"}"#, &tx).await;
        handle_text_frame(r#"{"type":"position","user_id":"42","value":5}"#, &tx).await;
        drop(tx);

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            TransportEvent::Frame(InboundFrame::Position {
                user_id: UserId::new("42"),
                message_id: MessageId(5),
            })
        );
        assert!(rx.recv().await.is_none());
    }
}
