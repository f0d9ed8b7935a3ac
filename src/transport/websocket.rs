//! WebSocket transport
//!
//! This file implements the WebSocket server that translates protocol JSON
//! events into relay operations. Responsibilities:
//! - Accept TCP/WebSocket connections; no handshake payload is required
//! - Create a `Connection` for each client and register it with the `Relay`
//! - Serialize/deserialize JSON events and forward them to the relay
//! - Tear the connection down exactly once, whether the receive loop or
//!   the send loop terminates first

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::spawn;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tracing::{info, warn};
use tungstenite::protocol::Message as WsMessage;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::client::Connection;
use crate::relay::engine::{Relay, SendRequest};
use crate::transport::message::{ClientMessage, ServerMessage};

pub async fn start_websocket_server(addr: String, relay: Arc<Mutex<Relay>>) {
    let listener = TcpListener::bind(addr.clone()).await.expect("Can't bind");

    info!("relay listening on ws://{addr}");

    while let Ok((stream, _)) = listener.accept().await {
        let relay = relay.clone();

        tokio::spawn(async move {
            let ws_stream = match accept_async(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    warn!("WebSocket handshake error: {e}");
                    return;
                }
            };
            let (mut ws_sender, mut ws_receiver) = ws_stream.split();
            let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
            let connection = Connection::new(tx.clone());
            let connection_id = connection.id.clone();
            {
                let mut relay = relay.lock().unwrap();
                relay.register_connection(connection);
            }
            info!("{connection_id} connected");

            let cleanup_called = Arc::new(AtomicBool::new(false));

            let do_cleanup = {
                let relay = relay.clone();
                let connection_id = connection_id.clone();
                let cleanup_called = cleanup_called.clone();

                move || {
                    if !cleanup_called.swap(true, Ordering::SeqCst) {
                        let mut relay = relay.lock().unwrap();
                        relay.cleanup_connection(&connection_id);
                    }
                }
            };

            {
                let connection_id = connection_id.clone();
                let do_cleanup = do_cleanup.clone();

                spawn(async move {
                    while let Some(msg) = rx.recv().await {
                        if let Err(e) = ws_sender.send(msg).await {
                            warn!("failed to send frame to {connection_id}: {e}");
                            break;
                        }
                    }

                    do_cleanup();
                    info!("send loop closed for {connection_id}");
                });
            }

            while let Some(Ok(msg)) = ws_receiver.next().await {
                if !msg.is_text() {
                    continue;
                }
                let text = match msg.to_text() {
                    Ok(text) => text,
                    Err(_) => continue,
                };

                match serde_json::from_str::<ClientMessage>(text) {
                    Ok(ClientMessage::SendMessage {
                        content,
                        sender_id,
                        receiver_id,
                        group_id,
                        file_url,
                        file_type,
                        expires_at,
                    }) => {
                        let request = SendRequest {
                            sender_id,
                            receiver_id,
                            content,
                            group_id,
                            file_url,
                            file_type,
                            expires_at,
                        };
                        info!(
                            "{connection_id} sent message {} -> {}",
                            request.sender_id, request.receiver_id
                        );
                        let mut relay = relay.lock().unwrap();
                        // Errors are already answered on this connection.
                        let _ = relay.send_message(&connection_id, request);
                    }

                    Ok(ClientMessage::History {
                        sender_id,
                        receiver_id,
                        group_id,
                    }) => {
                        let relay = relay.lock().unwrap();
                        let _ = relay.history(
                            &connection_id,
                            &sender_id,
                            &receiver_id,
                            group_id.as_deref(),
                        );
                    }

                    Ok(ClientMessage::Message { payload }) => {
                        // Legacy echo handler: fixed status, payload echoed back.
                        let response = ServerMessage::Status {
                            status: "ok".to_string(),
                            response: payload,
                        };
                        if let Ok(json) = serde_json::to_string(&response) {
                            let _ = tx.send(WsMessage::text(json));
                        }
                    }

                    Err(err) => {
                        warn!(
                            "invalid client message from {connection_id}: {err} | {}",
                            &text.chars().take(100).collect::<String>()
                        );
                        let response = ServerMessage::Error {
                            message: "invalid message".to_string(),
                        };
                        if let Ok(json) = serde_json::to_string(&response) {
                            let _ = tx.send(WsMessage::text(json));
                        }
                    }
                }
            }

            info!("{connection_id} disconnected");

            do_cleanup();
        });
    }
}
