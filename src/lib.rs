//! # EduConnect Relay
//!
//! `educonnect-relay` is the realtime message relay of the EduConnect
//! platform, extracted as a standalone WebSocket service. Clients hold a
//! persistent connection, emit `sendMessage` events, and the relay
//! persists each message before broadcasting the stored record to every
//! connected client.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct
//! responsibility:
//!
//! - `relay`: the engine that tracks connections, persists messages, and
//!   broadcasts persisted records.
//! - `client`: represents a connected WebSocket client.
//! - `config`: handles loading and managing server configuration.
//! - `persistence`: stores and retrieves messages per conversation (backed
//!   by `sled`).
//! - `transport`: manages the WebSocket server and communication with
//!   clients.
//! - `utils`: shared utilities, such as error handling and logging.

pub mod client;
pub mod config;
pub mod persistence;
pub mod relay;
pub mod transport;
pub mod utils;
