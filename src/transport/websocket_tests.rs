use crate::persistence::MessageStore;
use crate::relay::Relay;
use crate::transport::message::ServerMessage;
use crate::transport::websocket::start_websocket_server;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::sync::{Arc, Mutex};
use tokio_tungstenite::tungstenite::Message as WsMessage;

use tempfile::tempdir;

type WsClient = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

async fn setup_server() -> (String, Arc<Mutex<Relay>>, tempfile::TempDir) {
    let addr = format!(
        "127.0.0.1:{}",
        portpicker::pick_unused_port().expect("No free ports")
    );

    let temp_dir = tempdir().expect("Failed to create temp dir");
    let store = MessageStore::open(temp_dir.path().to_str().unwrap(), None, None)
        .expect("Failed to open store");
    let relay = Arc::new(Mutex::new(Relay::new_with_store(store)));

    tokio::spawn(start_websocket_server(addr.clone(), relay.clone()));

    // Give the server a moment to start up
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

    (addr, relay, temp_dir)
}

async fn connect(addr: &str) -> WsClient {
    let stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("Failed to connect");
    let (ws_stream, _) = tokio_tungstenite::client_async("ws://localhost/", stream)
        .await
        .expect("WebSocket handshake failed");
    ws_stream
}

async fn next_server_message(ws: &mut WsClient) -> ServerMessage {
    loop {
        let msg = ws
            .next()
            .await
            .expect("Did not receive a frame")
            .expect("WebSocket error");
        if msg.is_text() {
            let text = msg.to_text().unwrap();
            return serde_json::from_str(text)
                .unwrap_or_else(|e| panic!("Failed to deserialize ServerMessage from '{text}': {e}"));
        }
    }
}

#[tokio::test]
async fn test_send_message_reaches_all_clients() {
    let (addr, relay, _temp_dir) = setup_server().await;
    let mut ws_a = connect(&addr).await;
    let mut ws_b = connect(&addr).await;
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

    let send = json!({
        "type": "sendMessage",
        "content": "hi",
        "senderId": "u1",
        "receiverId": "u2"
    })
    .to_string();
    ws_a.send(WsMessage::Text(send.into())).await.unwrap();

    // The sender learns the outcome first, then sees the broadcast.
    let record = match next_server_message(&mut ws_a).await {
        ServerMessage::Sent { message } => message,
        other => panic!("Expected sent, got {other:?}"),
    };
    assert_eq!(record.content, "hi");
    assert_eq!(record.sender_id, "u1");
    assert!(!record.id.is_empty());

    match next_server_message(&mut ws_a).await {
        ServerMessage::NewMessage { message } => assert_eq!(message.id, record.id),
        other => panic!("Expected newMessage, got {other:?}"),
    }

    // Broadcast reaches every connection, not only the named receiver.
    match next_server_message(&mut ws_b).await {
        ServerMessage::NewMessage { message } => {
            assert_eq!(message.id, record.id);
            assert_eq!(message.content, "hi");
        }
        other => panic!("Expected newMessage, got {other:?}"),
    }

    let stored = relay
        .lock()
        .unwrap()
        .store()
        .load_conversation("dm:u1:u2")
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, record.id);
}

#[tokio::test]
async fn test_message_echo_returns_status() {
    let (addr, _relay, _temp_dir) = setup_server().await;
    let mut ws_stream = connect(&addr).await;

    let echo = json!({ "type": "message", "payload": "ping" }).to_string();
    ws_stream.send(WsMessage::Text(echo.into())).await.unwrap();

    match next_server_message(&mut ws_stream).await {
        ServerMessage::Status { status, response } => {
            assert_eq!(status, "ok");
            assert_eq!(response, "ping");
        }
        other => panic!("Expected status, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_message_gets_error_and_connection_survives() {
    let (addr, _relay, _temp_dir) = setup_server().await;
    let mut ws_stream = connect(&addr).await;

    ws_stream
        .send(WsMessage::Text("not json".to_string().into()))
        .await
        .unwrap();

    match next_server_message(&mut ws_stream).await {
        ServerMessage::Error { message } => assert_eq!(message, "invalid message"),
        other => panic!("Expected error, got {other:?}"),
    }

    // The connection is still usable after a malformed payload.
    let send = json!({
        "type": "sendMessage",
        "content": "still alive",
        "senderId": "u1",
        "receiverId": "u2"
    })
    .to_string();
    ws_stream.send(WsMessage::Text(send.into())).await.unwrap();

    match next_server_message(&mut ws_stream).await {
        ServerMessage::Sent { message } => assert_eq!(message.content, "still alive"),
        other => panic!("Expected sent, got {other:?}"),
    }
}

#[tokio::test]
async fn test_disconnect_does_not_affect_other_clients() {
    let (addr, relay, _temp_dir) = setup_server().await;
    let mut ws_a = connect(&addr).await;
    let mut ws_b = connect(&addr).await;
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    assert_eq!(relay.lock().unwrap().connections.len(), 2);

    ws_b.close(None).await.expect("Failed to close WebSocket");
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    assert_eq!(relay.lock().unwrap().connections.len(), 1);

    let send = json!({
        "type": "sendMessage",
        "content": "hi",
        "senderId": "u1",
        "receiverId": "u2"
    })
    .to_string();
    ws_a.send(WsMessage::Text(send.into())).await.unwrap();

    assert!(matches!(
        next_server_message(&mut ws_a).await,
        ServerMessage::Sent { .. }
    ));
    match next_server_message(&mut ws_a).await {
        ServerMessage::NewMessage { message } => assert_eq!(message.content, "hi"),
        other => panic!("Expected newMessage, got {other:?}"),
    }
}

#[tokio::test]
async fn test_history_returns_conversation() {
    let (addr, _relay, _temp_dir) = setup_server().await;
    let mut ws_stream = connect(&addr).await;

    for content in ["first", "second"] {
        let send = json!({
            "type": "sendMessage",
            "content": content,
            "senderId": "u1",
            "receiverId": "u2"
        })
        .to_string();
        ws_stream.send(WsMessage::Text(send.into())).await.unwrap();
        // drain the sent result and the broadcast
        assert!(matches!(
            next_server_message(&mut ws_stream).await,
            ServerMessage::Sent { .. }
        ));
        assert!(matches!(
            next_server_message(&mut ws_stream).await,
            ServerMessage::NewMessage { .. }
        ));
        tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
    }

    // requested by the other participant
    let history = json!({
        "type": "history",
        "senderId": "u2",
        "receiverId": "u1"
    })
    .to_string();
    ws_stream
        .send(WsMessage::Text(history.into()))
        .await
        .unwrap();

    match next_server_message(&mut ws_stream).await {
        ServerMessage::History { messages } => {
            let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
            assert_eq!(contents, vec!["first", "second"]);
        }
        other => panic!("Expected history, got {other:?}"),
    }
}
