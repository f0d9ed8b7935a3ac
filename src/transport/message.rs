//! Wire protocol
//!
//! Events are JSON objects tagged by a `type` field, with camelCase field
//! names. `sendMessage` and `newMessage` form the relay path; `message` is
//! the generic echo handler answered with a fixed status literal.

use serde::{Deserialize, Serialize};

use crate::relay::message::MessageRecord;

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "sendMessage", rename_all = "camelCase")]
    SendMessage {
        content: String,
        sender_id: String,
        receiver_id: String,
        #[serde(default)]
        group_id: Option<String>,
        #[serde(default)]
        file_url: Option<String>,
        #[serde(default)]
        file_type: Option<String>,
        #[serde(default)]
        expires_at: Option<i64>,
    },

    #[serde(rename = "history", rename_all = "camelCase")]
    History {
        sender_id: String,
        receiver_id: String,
        #[serde(default)]
        group_id: Option<String>,
    },

    #[serde(rename = "message")]
    Message { payload: String },
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Broadcast of a freshly persisted record to every connection.
    #[serde(rename = "newMessage")]
    NewMessage { message: MessageRecord },

    /// Send outcome, delivered to the originating connection before the
    /// broadcast goes out.
    #[serde(rename = "sent")]
    Sent { message: MessageRecord },

    #[serde(rename = "history")]
    History { messages: Vec<MessageRecord> },

    #[serde(rename = "status")]
    Status { status: String, response: String },

    #[serde(rename = "error")]
    Error { message: String },
}
