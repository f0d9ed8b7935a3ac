//! The `transport` module is responsible for handling network communication
//! with clients, primarily via WebSockets.
//!
//! It defines the event protocol used between clients and the relay, and
//! implements the WebSocket server itself, managing connections, message
//! parsing, and forwarding client events to the relay engine.

pub mod message;
pub mod websocket;

#[cfg(test)]
mod websocket_tests;

pub use message::{ClientMessage, ServerMessage};
pub use websocket::start_websocket_server;
