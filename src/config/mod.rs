mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{RelaySettings, ServerSettings, Settings};

/// Loads the configuration from the default file and environment variables.
/// Merges the configuration with default values.
/// Returns a `Settings` struct containing the server and relay
/// configurations.
///
/// Environment variables use `__` between the section and the field so
/// that field names containing underscores stay intact, for example
/// `SERVER__PORT` or `RELAY__MESSAGE_TTL_SECS`.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("__"));

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    Ok(Settings {
        server: ServerSettings {
            host: partial
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            port: partial
                .server
                .as_ref()
                .and_then(|s| s.port)
                .unwrap_or(default.server.port),
        },
        relay: RelaySettings {
            db_path: partial
                .relay
                .as_ref()
                .and_then(|r| r.db_path.clone())
                .unwrap_or(default.relay.db_path),
            message_ttl_secs: partial
                .relay
                .as_ref()
                .and_then(|r| r.message_ttl_secs)
                .unwrap_or(default.relay.message_ttl_secs),
            max_messages_per_conversation: partial
                .relay
                .as_ref()
                .and_then(|r| r.max_messages_per_conversation)
                .unwrap_or(default.relay.max_messages_per_conversation),
        },
    })
}
