//! The `persistence` module provides mechanisms for storing and retrieving
//! messages.
//!
//! Every relayed message is written here before it is broadcast, so a
//! relay restart loses nothing that was acknowledged to a sender, and
//! conversation history can be replayed to clients on request.
//!
//! Currently, it uses `sled` as an embedded key-value store for efficient
//! and durable message storage.

pub mod sled_store;
pub use sled_store::MessageStore;
