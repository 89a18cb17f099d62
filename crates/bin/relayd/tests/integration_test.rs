//! End-to-end tests for the relay daemon stack.
//!
//! Each test binds a real TCP listener on an ephemeral port, serves the
//! full axum router, and talks to it over actual WebSocket connections —
//! raw `tokio-tungstenite` sockets for protocol-level assertions, plus
//! the `RelayClient` adapter for the bridge-side path.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeZone;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use pulselink_adapter_relay_axum::{RelayHub, router};
use pulselink_adapter_relay_client::RelayClient;
use pulselink_app::ports::EventSink;
use pulselink_domain::event::DeviceEvent;
use pulselink_domain::id::DeviceId;
use pulselink_domain::message::RelayMessage;
use pulselink_domain::room::RoomName;
use pulselink_domain::time::Timestamp;

type WsClient = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Serve the full relay stack on an ephemeral port.
async fn serve() -> SocketAddr {
    let hub = Arc::new(RelayHub::new());
    let app = router::build(hub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(axum::serve(listener, app).into_future());
    addr
}

async fn connect(addr: SocketAddr) -> WsClient {
    let (socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .unwrap();
    socket
}

async fn send(client: &mut WsClient, message: &RelayMessage) {
    let json = serde_json::to_string(message).unwrap();
    client.send(Message::text(json)).await.unwrap();
}

async fn join(client: &mut WsClient, room: &str) {
    send(
        client,
        &RelayMessage::Join {
            room: RoomName::new(room),
        },
    )
    .await;
}

/// Receive the next text frame within one second, parsed.
async fn recv(client: &mut WsClient) -> RelayMessage {
    let frame = tokio::time::timeout(Duration::from_secs(1), client.next())
        .await
        .expect("frame should arrive within a second")
        .expect("stream should stay open")
        .expect("frame should be readable");
    match frame {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("unexpected frame: {other:?}"),
    }
}

/// Assert that no frame arrives within a short window.
async fn assert_silent(client: &mut WsClient) {
    let result = tokio::time::timeout(Duration::from_millis(300), client.next()).await;
    assert!(result.is_err(), "expected silence, got {result:?}");
}

/// Joins are handled per-session; give the server a beat to apply them
/// before routing frames from another session.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

fn ts() -> Timestamp {
    chrono::Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
}

fn data_frame(room: &str, value: f64) -> RelayMessage {
    RelayMessage::DeviceData {
        id: DeviceId::new("AA:BB:CC:DD:EE:FF"),
        value,
        unit: "bpm".into(),
        timestamp: ts(),
        room: RoomName::new(room),
    }
}

#[tokio::test]
async fn should_fan_out_to_room_members_including_sender() {
    let addr = serve().await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    join(&mut a, "ward-1").await;
    join(&mut b, "ward-1").await;
    settle().await;

    send(&mut a, &data_frame("ward-1", 72.0)).await;

    let got_a = recv(&mut a).await;
    let got_b = recv(&mut b).await;
    assert!(matches!(got_a, RelayMessage::DeviceData { value, .. } if (value - 72.0).abs() < f64::EPSILON));
    assert_eq!(got_a, got_b);
}

#[tokio::test]
async fn should_not_leak_frames_across_rooms() {
    let addr = serve().await;
    let mut a = connect(addr).await;
    let mut other = connect(addr).await;
    join(&mut a, "ward-1").await;
    join(&mut other, "ward-2").await;
    settle().await;

    send(&mut a, &data_frame("ward-1", 72.0)).await;

    recv(&mut a).await;
    assert_silent(&mut other).await;
}

#[tokio::test]
async fn should_route_by_new_room_after_rejoin() {
    let addr = serve().await;
    let mut mover = connect(addr).await;
    let mut sender = connect(addr).await;
    join(&mut mover, "ward-1").await;
    join(&mut mover, "ward-2").await;
    join(&mut sender, "ward-1").await;
    settle().await;

    send(&mut sender, &data_frame("ward-1", 60.0)).await;
    assert_silent(&mut mover).await;

    join(&mut sender, "ward-2").await;
    settle().await;
    send(&mut sender, &data_frame("ward-2", 61.0)).await;
    let got = recv(&mut mover).await;
    assert!(matches!(got, RelayMessage::DeviceData { value, .. } if (value - 61.0).abs() < f64::EPSILON));
}

#[tokio::test]
async fn should_survive_malformed_frame_and_keep_session() {
    let addr = serve().await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    join(&mut a, "ward-1").await;
    join(&mut b, "ward-1").await;
    settle().await;

    a.send(Message::text("this is not json")).await.unwrap();
    send(&mut a, &data_frame("ward-1", 72.0)).await;

    // The malformed frame was dropped; the valid one still routed.
    let got = recv(&mut b).await;
    assert!(matches!(got, RelayMessage::DeviceData { .. }));
}

#[tokio::test]
async fn should_drop_frames_without_membership() {
    let addr = serve().await;
    let mut lurker = connect(addr).await;
    let mut sender = connect(addr).await;
    join(&mut sender, "ward-1").await;
    settle().await;

    // `lurker` never joined; the sender's frame must not reach it.
    send(&mut sender, &data_frame("ward-1", 72.0)).await;
    assert_silent(&mut lurker).await;
}

#[tokio::test]
async fn should_deliver_events_emitted_through_relay_client() {
    let addr = serve().await;
    let mut observer = connect(addr).await;
    join(&mut observer, "ward-1").await;

    let url = url::Url::parse(&format!("ws://{addr}/ws")).unwrap();
    let client = RelayClient::connect(&url, RoomName::new("ward-1"), CancellationToken::new())
        .await
        .unwrap();
    settle().await;

    client
        .emit(DeviceEvent::Connected {
            id: DeviceId::new("AA:BB:CC:DD:EE:FF"),
            name: Some("Polar H10".into()),
            timestamp: ts(),
        })
        .await
        .unwrap();

    let got = recv(&mut observer).await;
    assert!(
        matches!(got, RelayMessage::DeviceConnected { ref name, .. } if name.as_deref() == Some("Polar H10"))
    );

    client.shutdown();
}

#[tokio::test]
async fn should_flush_queued_frames_before_closing() {
    let addr = serve().await;
    let mut observer = connect(addr).await;
    join(&mut observer, "ward-1").await;

    let url = url::Url::parse(&format!("ws://{addr}/ws")).unwrap();
    let client = RelayClient::connect(&url, RoomName::new("ward-1"), CancellationToken::new())
        .await
        .unwrap();
    settle().await;

    // Shut down right after emitting: the frame may still be queued
    // when the session task wakes, yet it must not be lost.
    client
        .emit(DeviceEvent::Disconnected {
            id: DeviceId::new("AA:BB:CC:DD:EE:FF"),
            timestamp: ts(),
        })
        .await
        .unwrap();
    client.shutdown();

    let got = recv(&mut observer).await;
    assert!(matches!(got, RelayMessage::DeviceDisconnected { .. }));
}

#[tokio::test]
async fn should_receive_frames_through_relay_client_subscription() {
    let addr = serve().await;

    let url = url::Url::parse(&format!("ws://{addr}/ws")).unwrap();
    let client = RelayClient::connect(&url, RoomName::new("ward-1"), CancellationToken::new())
        .await
        .unwrap();
    let mut inbound = client.subscribe();

    let mut sender = connect(addr).await;
    join(&mut sender, "ward-1").await;
    settle().await;

    send(&mut sender, &data_frame("ward-1", 88.0)).await;

    let got = tokio::time::timeout(Duration::from_secs(1), inbound.recv())
        .await
        .expect("frame should arrive within a second")
        .unwrap();
    assert!(matches!(got, RelayMessage::DeviceData { value, .. } if (value - 88.0).abs() < f64::EPSILON));

    client.shutdown();
}

#[tokio::test]
async fn should_answer_health_probe() {
    let addr = serve().await;
    let body = http_get(addr, "/health").await;
    assert_eq!(body, "OK");
}

/// Minimal HTTP GET over a raw TCP stream — avoids pulling an HTTP
/// client in just for the health probe.
async fn http_get(addr: SocketAddr, path: &str) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n").as_bytes())
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    let (_headers, body) = response
        .split_once("\r\n\r\n")
        .expect("response should have a body");
    body.trim().to_string()
}
