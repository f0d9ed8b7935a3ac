//! Message definitions for the relay
//!
//! `MessageRecord` is the persisted representation of a chat message and
//! also the payload carried by the `newMessage` broadcast. Field names are
//! camelCase on the wire to match the client payloads.
//!
//! Notes on fields:
//! - `id`: server-generated UUID, assigned at send time
//! - `sender_id` / `receiver_id`: user identifiers; the relay does not
//!   verify that either user exists
//! - `created_at`: milliseconds since UNIX epoch; set by the relay, never
//!   by the client
//! - `group_id`: present for group conversations, absent for direct ones
//! - `file_url` / `file_type`: optional attachment reference
//! - `expires_at`: optional expiry in milliseconds; expired records are
//!   removed by the store during cleanup

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl MessageRecord {
    /// The storage key of the conversation this record belongs to.
    pub fn conversation_key(&self) -> String {
        conversation_key(&self.sender_id, &self.receiver_id, self.group_id.as_deref())
    }
}

/// Derive the conversation key for a pair of participants.
///
/// Group conversations are keyed by their group id. Direct conversations
/// order the two participant ids so that both directions of the exchange
/// land in the same conversation.
pub fn conversation_key(sender_id: &str, receiver_id: &str, group_id: Option<&str>) -> String {
    match group_id {
        Some(group) => format!("group:{group}"),
        None => {
            let (low, high) = if sender_id <= receiver_id {
                (sender_id, receiver_id)
            } else {
                (receiver_id, sender_id)
            };
            format!("dm:{low}:{high}")
        }
    }
}
