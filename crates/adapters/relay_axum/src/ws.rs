//! WebSocket session handling.
//!
//! One task pair per session: a send task drains the hub's outbound
//! buffer into the socket while the read loop parses inbound frames.
//! Malformed frames are logged and skipped — per-message isolation so
//! one bad frame never terminates delivery for other sessions.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};

use pulselink_domain::message::RelayMessage;

use crate::hub::RelayHub;

/// `GET /ws` — upgrade to a relay session.
pub async fn handler(State(hub): State<Arc<RelayHub>>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| session(socket, hub))
}

async fn session(socket: WebSocket, hub: Arc<RelayHub>) {
    let (mut sink, mut stream) = socket.split();
    let (session_id, mut outbound) = hub.register();
    tracing::info!(session = %session_id, "relay session opened");

    let send_task = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(err) => {
                    tracing::warn!(session = %session_id, %err, "failed to encode outbound frame");
                    continue;
                }
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<RelayMessage>(&text) {
                Ok(RelayMessage::Join { room }) => hub.join(session_id, room),
                Ok(message) => {
                    hub.route(&message);
                }
                Err(err) => {
                    tracing::warn!(session = %session_id, %err, "malformed frame dropped");
                }
            },
            Ok(Message::Close(_)) => break,
            // Binary frames are not part of the protocol; ping/pong is
            // handled by axum.
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(session = %session_id, %err, "socket error, closing session");
                break;
            }
        }
    }

    hub.deregister(session_id);
    send_task.abort();
    tracing::info!(session = %session_id, "relay session closed");
}
