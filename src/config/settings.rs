use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Includes settings for both the server and the relay.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub relay: RelaySettings,
}

/// Configuration settings for the server.
///
/// Defines the host and port the server will bind to.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Configuration settings for the relay.
///
/// Controls where messages are stored and how long they are retained.
#[derive(Debug, Deserialize, Clone)]
pub struct RelaySettings {
    pub db_path: String,
    pub message_ttl_secs: u64,
    pub max_messages_per_conversation: usize,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled
/// using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub relay: Option<PartialRelaySettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct PartialRelaySettings {
    pub db_path: Option<String>,
    pub message_ttl_secs: Option<u64>,
    pub max_messages_per_conversation: Option<usize>,
}

/// Provides default values for `Settings`.
///
/// Ensures the application has sensible defaults if no configuration is
/// provided.
impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            relay: RelaySettings {
                db_path: "relay_db".to_string(),
                message_ttl_secs: 3600,
                max_messages_per_conversation: 1000,
            },
        }
    }
}
