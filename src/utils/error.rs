//! The `error` module defines the error type used within the relay.
//!
//! Every fallible relay operation returns `RelayError`, so a failed store
//! or a bad payload can be reported back to the connection that caused it
//! instead of disappearing into a log.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
