//! Connection registry
//!
//! `ConnectionRegistry` owns the set of currently connected clients. It is
//! created together with the relay, entries are inserted when a client
//! connects and removed when it disconnects.
//!
//! Concurrency note: callers must synchronize access (for example via the
//! relay lock) when modifying the registry.

use std::collections::HashMap;

use crate::client::Connection;

pub type ConnectionId = String;

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
        }
    }

    /// Add a connection. Re-inserting the same id replaces the old handle.
    pub fn insert(&mut self, connection: Connection) {
        self.connections.insert(connection.id.clone(), connection);
    }

    /// Remove a connection, returning its handle if it was registered.
    pub fn remove(&mut self, id: &ConnectionId) -> Option<Connection> {
        self.connections.remove(id)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConnectionId, &Connection)> {
        self.connections.iter()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
