//! The `client` module defines the representation of a connected client.
//!
//! It provides the `Connection` struct, which encapsulates the state of a
//! single connected client: its unique identifier and the channel for
//! pushing frames to it.

pub mod connection;
pub use connection::Connection;
