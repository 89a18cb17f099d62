//! # pulselink-adapter-relay-client
//!
//! WebSocket client for the relay hub.
//!
//! Connects, joins a room, then runs one background session task:
//! outbound device events are encoded and written to the socket, inbound
//! frames are parsed and fanned into a [`tokio::sync::broadcast`]
//! channel for any number of local consumers. Teardown goes through a
//! [`CancellationToken`].
//!
//! The client implements the application's [`EventSink`] port, so a
//! device connection supervisor can be pointed at a live relay without
//! knowing anything about sockets.
//!
//! There is no transport-level reconnection here: the reconnect
//! machinery in this system belongs to the radio link. When the relay
//! socket drops, the session ends and subsequent emits fail with
//! [`RelayError::Closed`].

use std::future::Future;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use url::Url;

use pulselink_app::ports::EventSink;
use pulselink_domain::error::RelayError;
use pulselink_domain::event::DeviceEvent;
use pulselink_domain::message::RelayMessage;
use pulselink_domain::room::RoomName;

/// Outbound queue depth between emitters and the socket writer.
const OUTBOUND_BUFFER: usize = 64;

/// Inbound broadcast capacity; lagging consumers lose frames, which
/// matches the protocol's at-most-once delivery.
const INBOUND_CAPACITY: usize = 256;

/// Errors establishing a relay session.
#[derive(Debug, thiserror::Error)]
pub enum RelayClientError {
    /// The WebSocket handshake failed.
    #[error("failed to connect to relay: {0}")]
    Connect(String),

    /// The join frame could not be encoded or written.
    #[error("failed to join room: {0}")]
    Join(String),
}

/// Handle to a live relay session.
pub struct RelayClient {
    room: RoomName,
    outbound: mpsc::Sender<RelayMessage>,
    inbound: broadcast::Sender<RelayMessage>,
    cancel: CancellationToken,
}

impl RelayClient {
    /// Connect to the hub, join `room`, and spawn the session task.
    ///
    /// # Errors
    ///
    /// Returns [`RelayClientError`] when the handshake fails or the join
    /// frame cannot be delivered.
    pub async fn connect(
        url: &Url,
        room: RoomName,
        cancel: CancellationToken,
    ) -> Result<Self, RelayClientError> {
        tracing::info!(%url, %room, "connecting to relay");
        let (socket, _response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|err| RelayClientError::Connect(err.to_string()))?;
        let (mut sink, stream) = socket.split();

        let join = RelayMessage::Join { room: room.clone() };
        let frame =
            serde_json::to_string(&join).map_err(|err| RelayClientError::Join(err.to_string()))?;
        sink.send(tungstenite::Message::text(frame))
            .await
            .map_err(|err| RelayClientError::Join(err.to_string()))?;

        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_BUFFER);
        let (inbound_tx, _) = broadcast::channel(INBOUND_CAPACITY);

        tokio::spawn(session(
            sink,
            stream,
            outbound_rx,
            inbound_tx.clone(),
            cancel.clone(),
        ));

        Ok(Self {
            room,
            outbound: outbound_tx,
            inbound: inbound_tx,
            cancel,
        })
    }

    /// The room this session joined.
    #[must_use]
    pub fn room(&self) -> &RoomName {
        &self.room
    }

    /// Subscribe to inbound frames. Multiple consumers may subscribe;
    /// each lagging consumer loses its own frames.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RelayMessage> {
        self.inbound.subscribe()
    }

    /// Signal the session task to shut down. Frames already queued for
    /// sending are flushed before the socket closes.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl EventSink for RelayClient {
    fn emit(&self, event: DeviceEvent) -> impl Future<Output = Result<(), RelayError>> + Send {
        let message = RelayMessage::from_event(event, self.room.clone());
        let outbound = self.outbound.clone();
        async move {
            outbound
                .send(message)
                .await
                .map_err(|_| RelayError::Closed)
        }
    }
}

type WsSink = futures_util::stream::SplitSink<
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
    tungstenite::Message,
>;
type WsStream = futures_util::stream::SplitStream<
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
>;

/// One session: write outbound frames, parse inbound ones, stop on
/// cancellation or socket loss.
async fn session(
    mut sink: WsSink,
    mut stream: WsStream,
    mut outbound: mpsc::Receiver<RelayMessage>,
    inbound: broadcast::Sender<RelayMessage>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                // Flush frames queued before the shutdown request so a
                // final disconnected event still reaches observers.
                while let Ok(message) = outbound.try_recv() {
                    let Ok(frame) = serde_json::to_string(&message) else {
                        continue;
                    };
                    if sink.send(tungstenite::Message::text(frame)).await.is_err() {
                        break;
                    }
                }
                let _ = sink.send(tungstenite::Message::Close(None)).await;
                break;
            }
            message = outbound.recv() => {
                let Some(message) = message else { break };
                let frame = match serde_json::to_string(&message) {
                    Ok(frame) => frame,
                    Err(err) => {
                        tracing::warn!(%err, "failed to encode outbound frame");
                        continue;
                    }
                };
                if let Err(err) = sink.send(tungstenite::Message::text(frame)).await {
                    tracing::warn!(%err, "relay socket write failed, ending session");
                    break;
                }
            }
            frame = stream.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        match serde_json::from_str::<RelayMessage>(text.as_str()) {
                            Ok(message) => {
                                // Fails only with zero subscribers, which is fine.
                                let _ = inbound.send(message);
                            }
                            Err(err) => {
                                tracing::warn!(%err, "malformed inbound frame dropped");
                            }
                        }
                    }
                    Some(Ok(tungstenite::Message::Close(_))) | None => {
                        tracing::info!("relay closed the session");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        tracing::warn!(%err, "relay socket read failed, ending session");
                        break;
                    }
                }
            }
        }
    }
    tracing::debug!("relay session task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_connect_error_with_cause() {
        let err = RelayClientError::Connect("connection refused".into());
        assert_eq!(
            err.to_string(),
            "failed to connect to relay: connection refused"
        );
    }

    #[test]
    fn should_display_join_error_with_cause() {
        let err = RelayClientError::Join("socket closed".into());
        assert_eq!(err.to_string(), "failed to join room: socket closed");
    }
}
