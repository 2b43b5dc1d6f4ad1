//! Background WebSocket connection loop with fixed-delay reconnect.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;

use chatstatus_common::ChatStatusError;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, RwLock};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error, info, warn};

use super::handler::handle_text_frame;
use super::state::ConnectionMachine;
use super::types::{ConnectionState, TransportCommand, TransportConfig, TransportEvent};

/// What ended one pass of the loop.
enum Outcome {
    Closed,
    Shutdown,
}

// ---------------------------------------------------------------------------
// Connection Loop
// ---------------------------------------------------------------------------

/// Background task that owns the relay socket.
///
/// Connects, keeps the socket alive, forwards frames in both directions,
/// and after every close waits `retry_interval` before trying again. Runs
/// until a `Shutdown` command arrives or the command channel closes.
pub(crate) async fn connection_loop(
    config: TransportConfig,
    state: Arc<RwLock<ConnectionState>>,
    event_tx: mpsc::Sender<TransportEvent>,
    mut command_rx: mpsc::Receiver<TransportCommand>,
) {
    let mut machine = ConnectionMachine::new(config.ping_interval, config.retry_interval);
    let url = config.ws_url();

    loop {
        if !machine.connect() {
            warn!(state = ?machine.state(), "Connect requested while socket is live");
        }
        *state.write().await = machine.state();
        info!(url = %url, "Connecting to presence relay");

        let outcome = run_connection(
            &config,
            &url,
            &mut machine,
            &state,
            &event_tx,
            &mut command_rx,
        )
        .await;

        if let Outcome::Shutdown = outcome {
            machine.on_close(Instant::now());
            *state.write().await = machine.state();
            let _ = event_tx.send(TransportEvent::Closed).await;
            info!("Presence transport shut down");
            return;
        }

        machine.on_close(Instant::now());
        *state.write().await = machine.state();
        let _ = event_tx.send(TransportEvent::Closed).await;

        info!(
            delay_secs = machine.retry_interval().as_secs(),
            "Reconnecting in {} seconds",
            machine.retry_interval().as_secs()
        );
        if let Outcome::Shutdown = wait_for_retry(&machine, &mut command_rx).await {
            info!("Presence transport shut down");
            return;
        }
    }
}

/// One connect attempt and, if it succeeds, the life of that socket.
async fn run_connection(
    config: &TransportConfig,
    url: &str,
    machine: &mut ConnectionMachine,
    state: &Arc<RwLock<ConnectionState>>,
    event_tx: &mpsc::Sender<TransportEvent>,
    command_rx: &mut mpsc::Receiver<TransportCommand>,
) -> Outcome {
    let attempt = tokio::time::timeout(config.connect_timeout, tokio_tungstenite::connect_async(url));
    tokio::pin!(attempt);

    // Frames queued while connecting are dropped, never replayed.
    let connected = loop {
        tokio::select! {
            result = &mut attempt => break result,
            cmd = command_rx.recv() => match cmd {
                Some(TransportCommand::Send(frame)) => {
                    let _ = machine.prepare_send(&frame);
                }
                Some(TransportCommand::Shutdown) | None => return Outcome::Shutdown,
            },
        }
    };

    let ws_stream = match connected {
        Ok(Ok((ws_stream, _))) => ws_stream,
        Ok(Err(e)) => {
            let err = network_error(format!("connection failed: {e}"));
            error!(error = %err, "Failed to connect to presence relay");
            machine.on_error(&err.to_string());
            let _ = event_tx.send(TransportEvent::Error(err.to_string())).await;
            return Outcome::Closed;
        }
        Err(_elapsed) => {
            let err = network_error(format!(
                "connection timed out after {}s",
                config.connect_timeout.as_secs()
            ));
            error!(error = %err, "Failed to connect to presence relay");
            let _ = event_tx.send(TransportEvent::Error(err.to_string())).await;
            return Outcome::Closed;
        }
    };

    machine.on_open(Instant::now());
    *state.write().await = machine.state();
    info!("Presence relay connection open");
    let _ = event_tx.send(TransportEvent::Opened).await;

    let (mut ws_write, mut ws_read) = ws_stream.split();

    loop {
        let ping_at = machine
            .next_ping()
            .unwrap_or_else(|| Instant::now() + config.ping_interval);

        tokio::select! {
            frame = ws_read.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    handle_text_frame(&text, event_tx).await;
                }
                Some(Ok(WsMessage::Close(_))) | None => {
                    info!("Presence relay closed connection");
                    return Outcome::Closed;
                }
                Some(Err(e)) => {
                    let err = network_error(e);
                    machine.on_error(&err.to_string());
                    let _ = event_tx.send(TransportEvent::Error(err.to_string())).await;
                    return Outcome::Closed;
                }
                Some(Ok(_)) => {}
            },
            cmd = command_rx.recv() => match cmd {
                Some(TransportCommand::Send(frame)) => {
                    if let Some(json) = machine.prepare_send(&frame) {
                        debug!(frame = %json, "Sending frame");
                        if let Err(e) = ws_write.send(WsMessage::Text(json.into())).await {
                            let err = network_error(e);
                            machine.on_error(&err.to_string());
                            let _ = event_tx.send(TransportEvent::Error(err.to_string())).await;
                            return Outcome::Closed;
                        }
                    }
                }
                Some(TransportCommand::Shutdown) | None => {
                    machine.begin_close();
                    *state.write().await = machine.state();
                    let _ = ws_write.send(WsMessage::Close(None)).await;
                    return Outcome::Shutdown;
                }
            },
            _ = tokio::time::sleep_until(tokio::time::Instant::from_std(ping_at)) => {
                if let Some(ping) = machine.poll_ping(Instant::now()) {
                    if let Some(json) = machine.prepare_send(&ping) {
                        debug!("ping");
                        if ws_write.send(WsMessage::Text(json.into())).await.is_err() {
                            return Outcome::Closed;
                        }
                    }
                }
            }
        }
    }
}

/// Wait until the machine says a reconnect is due, dropping any frames sent
/// in the meantime.
async fn wait_for_retry(
    machine: &ConnectionMachine,
    command_rx: &mut mpsc::Receiver<TransportCommand>,
) -> Outcome {
    loop {
        let now = Instant::now();
        if machine.reconnect_due(now) {
            return Outcome::Closed;
        }
        let wake_at = machine.reconnect_at().unwrap_or(now + machine.retry_interval());

        tokio::select! {
            _ = tokio::time::sleep_until(tokio::time::Instant::from_std(wake_at)) => {}
            cmd = command_rx.recv() => match cmd {
                Some(TransportCommand::Send(frame)) => {
                    debug!(kind = frame.kind(), "Dropping frame while disconnected");
                }
                Some(TransportCommand::Shutdown) | None => return Outcome::Shutdown,
            },
        }
    }
}

fn network_error(e: impl Display) -> ChatStatusError {
    ChatStatusError::Network(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::time::Duration;

    use chatstatus_common::{RoomId, UserId};
    use tokio::net::TcpListener;
    use tokio::time::timeout;

    use crate::transport::TransportClient;

    fn local_config(addr: SocketAddr) -> TransportConfig {
        let mut config = TransportConfig::new(addr.to_string(), RoomId::new("7"), UserId::new("42"));
        config.secure = false;
        config.ping_interval = Duration::from_secs(1);
        config.retry_interval = Duration::from_secs(60);
        config.connect_timeout = Duration::from_secs(5);
        config
    }

    #[test]
    fn network_error_keeps_message() {
        let err = network_error("connection reset");
        assert!(matches!(err, ChatStatusError::Network(_)));
        assert_eq!(err.to_string(), "network error: connection reset");
    }

    #[tokio::test]
    async fn relay_close_waits_for_retry_then_shuts_down() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Accept one socket, read the first text frame, then close.
        let relay = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            let first = loop {
                match ws.next().await {
                    Some(Ok(WsMessage::Text(text))) => break text.as_str().to_owned(),
                    Some(Ok(_)) => continue,
                    other => panic!("relay read failed: {other:?}"),
                }
            };
            ws.close(None).await.unwrap();
            while let Some(Ok(_)) = ws.next().await {}
            first
        });

        let (client, mut events) = TransportClient::connect(local_config(addr));

        let opened = timeout(Duration::from_secs(5), events.recv()).await.unwrap();
        assert_eq!(opened, Some(TransportEvent::Opened));

        let first = timeout(Duration::from_secs(5), relay).await.unwrap().unwrap();
        assert_eq!(first, r#"{"type":"ping"}"#);

        let closed = timeout(Duration::from_secs(5), events.recv()).await.unwrap();
        assert_eq!(closed, Some(TransportEvent::Closed));

        // Retry is 60s away; nothing else happens in the meantime.
        assert!(timeout(Duration::from_millis(1500), events.recv()).await.is_err());
        assert_eq!(client.state().await, ConnectionState::Disconnected);

        client.shutdown().await;
        let end = timeout(Duration::from_secs(5), events.recv()).await.unwrap();
        assert_eq!(end, None);
    }
}
