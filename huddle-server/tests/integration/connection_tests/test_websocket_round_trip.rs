use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use futures::{SinkExt, StreamExt};
use huddle_core::utils::default_ice_servers;
use huddle_core::{ClientSignal, ConnectionId, RelaySignal, RoomId};
use huddle_server::{build_router, spawn_relay};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::integration::init_tracing;
use crate::utils::SIGNAL_TIMEOUT_MS;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_relay() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_router(spawn_relay(default_ice_servers()));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

async fn connect(addr: SocketAddr) -> Result<(Socket, ConnectionId)> {
    let (mut socket, _) = connect_async(format!("ws://{}/ws", addr))
        .await
        .context("WebSocket connect failed")?;

    match next_signal(&mut socket).await? {
        RelaySignal::Welcome {
            connection_id,
            ice_servers,
        } => {
            assert!(!ice_servers.is_empty());
            Ok((socket, connection_id))
        }
        other => bail!("Expected welcome, got {:?}", other),
    }
}

async fn send_signal(socket: &mut Socket, signal: &ClientSignal) -> Result<()> {
    let text = serde_json::to_string(signal)?;
    socket.send(Message::Text(text.into())).await?;
    Ok(())
}

async fn next_signal(socket: &mut Socket) -> Result<RelaySignal> {
    loop {
        let msg = tokio::time::timeout(Duration::from_millis(SIGNAL_TIMEOUT_MS), socket.next())
            .await
            .context("Timeout waiting for relay")?
            .context("Socket closed")??;

        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).context("Bad envelope from relay");
        }
    }
}

fn join(room: &str, name: &str) -> ClientSignal {
    ClientSignal::JoinRoom {
        room_id: RoomId::from(room),
        user_name: name.into(),
        user_id: format!("user_{}", name),
    }
}

#[tokio::test]
async fn test_two_sockets_join_and_chat() {
    init_tracing();

    let addr = start_relay().await;
    let (mut a, a_id) = connect(addr).await.unwrap();
    let (mut b, b_id) = connect(addr).await.unwrap();
    assert_ne!(a_id, b_id);

    send_signal(&mut a, &join("room-1", "A")).await.unwrap();
    assert_eq!(
        next_signal(&mut a).await.unwrap(),
        RelaySignal::ExistingParticipants(vec![])
    );

    send_signal(&mut b, &join("room-1", "B")).await.unwrap();
    match next_signal(&mut b).await.unwrap() {
        RelaySignal::ExistingParticipants(list) => {
            assert_eq!(list.len(), 1);
            assert_eq!(list[0].connection_id, a_id);
        }
        other => panic!("unexpected {:?}", other),
    }
    match next_signal(&mut a).await.unwrap() {
        RelaySignal::UserJoined(p) => assert_eq!(p.connection_id, b_id),
        other => panic!("unexpected {:?}", other),
    }

    send_signal(
        &mut b,
        &ClientSignal::SendMessage {
            room_id: RoomId::from("room-1"),
            message: "hello over the wire".into(),
            sender: "B".into(),
            timestamp: "08:00".into(),
        },
    )
    .await
    .unwrap();

    for socket in [&mut a, &mut b] {
        match next_signal(socket).await.unwrap() {
            RelaySignal::ReceiveMessage {
                message,
                connection_id,
                ..
            } => {
                assert_eq!(message, "hello over the wire");
                assert_eq!(connection_id, b_id);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_closing_socket_announces_disconnect() {
    init_tracing();

    let addr = start_relay().await;
    let (mut a, _) = connect(addr).await.unwrap();
    let (mut b, b_id) = connect(addr).await.unwrap();

    send_signal(&mut a, &join("room-2", "A")).await.unwrap();
    next_signal(&mut a).await.unwrap();
    send_signal(&mut b, &join("room-2", "B")).await.unwrap();
    next_signal(&mut b).await.unwrap();
    next_signal(&mut a).await.unwrap();

    b.close(None).await.unwrap();

    match next_signal(&mut a).await.unwrap() {
        RelaySignal::UserDisconnected {
            connection_id,
            user_name,
        } => {
            assert_eq!(connection_id, b_id);
            assert_eq!(user_name, "B");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_garbage_frame_keeps_connection_open() {
    init_tracing();

    let addr = start_relay().await;
    let (mut a, _) = connect(addr).await.unwrap();

    a.send(Message::Text("{\"event\":\"no-such-event\"}".to_string().into()))
        .await
        .unwrap();
    send_signal(&mut a, &join("room-3", "A")).await.unwrap();

    assert_eq!(
        next_signal(&mut a).await.unwrap(),
        RelaySignal::ExistingParticipants(vec![])
    );
}

#[tokio::test]
async fn test_health_endpoint() {
    init_tracing();

    let addr = start_relay().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains("healthy"));
}
