//! Persistence layer backed by `sled`
//!
//! Messages are stored one tree per conversation. Each key is prefixed
//! with the record's creation timestamp so iteration yields messages in
//! chronological order and retention cleanup can scan cheaply.
//!
//! Retention options supported:
//! - `ttl_seconds`: optional store-wide time-to-live (older messages are
//!   removed during cleanup)
//! - `max_messages_per_conversation`: optional cap per conversation; when
//!   exceeded the oldest messages are removed
//!
//! Independently of both, a record carrying its own `expiresAt` timestamp
//! is removed once that moment has passed.

use chrono::Utc;
use sled::Db;
use tracing::warn;

use crate::relay::message::MessageRecord;
use crate::utils::error::RelayError;

#[derive(Clone)]
pub struct MessageStore {
    db: Db,
    ttl_seconds: Option<i64>,
    max_messages_per_conversation: Option<usize>,
    #[cfg(test)]
    fail_writes: bool,
}

impl MessageStore {
    /// Open or create a sled database at `path` with the given retention
    /// policy.
    pub fn open(
        path: &str,
        ttl_seconds: Option<i64>,
        max_messages_per_conversation: Option<usize>,
    ) -> Result<Self, RelayError> {
        let db = sled::open(path)?;
        Ok(Self {
            db,
            ttl_seconds,
            max_messages_per_conversation,
            #[cfg(test)]
            fail_writes: false,
        })
    }

    /// Make every subsequent `store` call fail, to exercise the error
    /// path without breaking the underlying database.
    #[cfg(test)]
    pub(crate) fn with_failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Store one record in its conversation's tree. Keys are
    /// timestamp-prefixed so iteration stays chronological.
    pub fn store(&self, record: &MessageRecord) -> Result<(), RelayError> {
        #[cfg(test)]
        if self.fail_writes {
            return Err(sled::Error::Io(std::io::Error::other("write failure")).into());
        }

        let conversation = record.conversation_key();
        let serialized = serde_json::to_vec(record)?;
        let tree = self.db.open_tree(&conversation)?;

        let key = format!("{:020}_{}", record.created_at, record.id);
        tree.insert(key.as_bytes(), serialized)?;

        if let Some(max) = self.max_messages_per_conversation {
            let total = tree.len();
            if total > max {
                let excess = total - max;

                let keys_to_delete: Vec<_> = tree
                    .iter()
                    .take(excess)
                    .filter_map(|entry| entry.ok().map(|(k, _)| k))
                    .collect();

                for key in keys_to_delete {
                    if let Err(e) = tree.remove(key) {
                        warn!("failed to trim conversation '{conversation}': {e}");
                    }
                }
            }
        }

        Ok(())
    }

    /// Load a conversation's records honoring TTL and expiry, oldest first.
    pub fn load_conversation(&self, conversation: &str) -> Result<Vec<MessageRecord>, RelayError> {
        self.cleanup_expired(conversation)?;
        let tree = self.db.open_tree(conversation)?;

        Ok(tree
            .iter()
            .filter_map(|res| res.ok())
            .filter_map(|(_, val)| serde_json::from_slice(&val).ok())
            .collect())
    }

    /// Remove records that outlived the store TTL or their own `expiresAt`.
    fn cleanup_expired(&self, conversation: &str) -> Result<(), RelayError> {
        let now = Utc::now().timestamp_millis();
        let cutoff = self.ttl_seconds.map(|ttl| now - ttl * 1000);

        let tree = self.db.open_tree(conversation)?;
        let expired: Vec<_> = tree
            .iter()
            .filter_map(|res| res.ok())
            .filter(|(key, val)| {
                if let (Some(cutoff), Some(ts)) = (cutoff, key_timestamp(key)) {
                    if ts < cutoff {
                        return true;
                    }
                }
                if let Ok(record) = serde_json::from_slice::<MessageRecord>(val) {
                    if let Some(expires_at) = record.expires_at {
                        if expires_at <= now {
                            return true;
                        }
                    }
                }
                false
            })
            .map(|(key, _)| key)
            .collect();

        for key in expired {
            let _ = tree.remove(key);
        }

        Ok(())
    }
}

fn key_timestamp(key: &[u8]) -> Option<i64> {
    let key = std::str::from_utf8(key).ok()?;
    let (ts, _) = key.split_once('_')?;
    ts.parse().ok()
}

impl std::fmt::Debug for MessageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageStore")
            .field("db", &"sled::Db")
            .finish()
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::open("relay_db", Some(3600), Some(1000)).expect("Failed to open message store")
    }
}
