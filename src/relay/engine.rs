//! Relay engine
//!
//! This module contains the in-memory relay implementation responsible for:
//! - tracking connected clients through the `ConnectionRegistry`
//! - persisting inbound messages and broadcasting the persisted record
//! - answering each send on the originating connection before broadcasting
//! - replaying stored conversation history on request
//!
//! Concurrency and usage notes:
//! - The public API here is synchronous and designed to be held behind a
//!   lock (for example `Arc<Mutex<Relay>>`) by the transport layer. Callers
//!   should avoid holding the relay lock across network I/O to prevent
//!   blocking other connections.
//! - Delivery is best-effort: a connection whose channel has closed is
//!   skipped with a warning and does not affect the remaining connections.

use chrono::Utc;
use tracing::{info, warn};
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use crate::client::Connection;
use crate::persistence::MessageStore;
use crate::relay::message::{MessageRecord, conversation_key};
use crate::relay::registry::{ConnectionId, ConnectionRegistry};
use crate::transport::message::ServerMessage;
use crate::utils::error::RelayError;

/// The fields of an inbound `sendMessage` event, before the relay assigns
/// an id and timestamp.
#[derive(Debug)]
pub struct SendRequest {
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub group_id: Option<String>,
    pub file_url: Option<String>,
    pub file_type: Option<String>,
    pub expires_at: Option<i64>,
}

#[derive(Debug)]
pub struct Relay {
    pub connections: ConnectionRegistry,
    store: MessageStore,
}

impl Default for Relay {
    fn default() -> Self {
        if cfg!(test) {
            let dir = tempfile::tempdir().expect("create temp dir").keep();
            let store = MessageStore::open(dir.to_str().expect("temp dir path"), None, None)
                .expect("open test message store");
            Self::new_with_store(store)
        } else {
            Self::new()
        }
    }
}

impl Relay {
    pub fn new() -> Self {
        Self::new_with_store(MessageStore::default())
    }

    pub fn new_with_store(store: MessageStore) -> Self {
        Self {
            connections: ConnectionRegistry::new(),
            store,
        }
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn register_connection(&mut self, connection: Connection) {
        self.connections.insert(connection);
    }

    /// Remove a disconnected client. Nothing is queued per connection, so
    /// dropping the handle is the whole cleanup.
    pub fn cleanup_connection(&mut self, id: &ConnectionId) {
        if self.connections.remove(id).is_some() {
            info!("cleaned up connection {id}");
        }
    }

    /// Persist a message and relay it.
    ///
    /// The originating connection learns the outcome first: a `sent` event
    /// carrying the persisted record on success, an `error` event on
    /// storage failure. Only after a successful store does the record go
    /// out as a `newMessage` broadcast to every connected client; clients
    /// filter by sender/receiver id on their side.
    pub fn send_message(
        &mut self,
        origin: &ConnectionId,
        request: SendRequest,
    ) -> Result<MessageRecord, RelayError> {
        let record = MessageRecord {
            id: Uuid::new_v4().to_string(),
            sender_id: request.sender_id,
            receiver_id: request.receiver_id,
            content: request.content,
            created_at: Utc::now().timestamp_millis(),
            group_id: request.group_id,
            file_url: request.file_url,
            file_type: request.file_type,
            expires_at: request.expires_at,
        };

        if let Err(e) = self.store.store(&record) {
            warn!("failed to persist message from {origin}: {e}");
            self.reply(
                origin,
                &ServerMessage::Error {
                    message: "failed to persist message".to_string(),
                },
            );
            return Err(e);
        }

        self.reply(
            origin,
            &ServerMessage::Sent {
                message: record.clone(),
            },
        );
        self.broadcast(&ServerMessage::NewMessage {
            message: record.clone(),
        });

        Ok(record)
    }

    /// Replay the stored history of a conversation to the requesting
    /// connection, oldest first. Either participant may be listed as the
    /// sender.
    pub fn history(
        &self,
        origin: &ConnectionId,
        sender_id: &str,
        receiver_id: &str,
        group_id: Option<&str>,
    ) -> Result<Vec<MessageRecord>, RelayError> {
        let key = conversation_key(sender_id, receiver_id, group_id);
        match self.store.load_conversation(&key) {
            Ok(messages) => {
                self.reply(
                    origin,
                    &ServerMessage::History {
                        messages: messages.clone(),
                    },
                );
                Ok(messages)
            }
            Err(e) => {
                warn!("failed to load history for '{key}': {e}");
                self.reply(
                    origin,
                    &ServerMessage::Error {
                        message: "failed to load history".to_string(),
                    },
                );
                Err(e)
            }
        }
    }

    /// Send an event to a single connection.
    pub fn reply(&self, id: &ConnectionId, msg: &ServerMessage) {
        let Some(connection) = self.connections.get(id) else {
            warn!("no connection registered with id: {id}");
            return;
        };
        match serde_json::to_string(msg) {
            Ok(json) => {
                if let Err(e) = connection.sender.send(WsMessage::text(json)) {
                    warn!("failed to send to {id}: {e}");
                }
            }
            Err(e) => warn!("failed to serialize server message: {e}"),
        }
    }

    /// Send an event to every connected client.
    pub fn broadcast(&self, msg: &ServerMessage) {
        let text = match serde_json::to_string(msg) {
            Ok(json) => json,
            Err(e) => {
                warn!("failed to serialize server message: {e}");
                return;
            }
        };
        let frame = WsMessage::text(text);

        for (id, connection) in self.connections.iter() {
            if let Err(e) = connection.sender.send(frame.clone()) {
                warn!("failed to send to {id}: {e}");
            }
        }
    }
}
