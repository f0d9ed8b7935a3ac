//! Connection handle
//!
//! `Connection` models a single client's persistent link to the relay and
//! holds the sending side of a per-client channel used by the relay to
//! push frames. No handshake payload is required, so a connection carries
//! no identity beyond its generated id; clients identify themselves per
//! message through the sender/receiver fields.

use tokio::sync::mpsc::UnboundedSender;
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

#[derive(Debug)]
pub struct Connection {
    pub id: String,
    pub sender: UnboundedSender<WsMessage>,
}

impl Connection {
    /// Create a new connection handle. The `id` is a UUID used to identify
    /// the connection across relay operations.
    pub fn new(sender: UnboundedSender<WsMessage>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
        }
    }
}
