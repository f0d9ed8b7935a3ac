use std::sync::{Arc, Mutex};

use tracing::{error, info};

use educonnect_relay::config::load_config;
use educonnect_relay::persistence::MessageStore;
use educonnect_relay::relay::Relay;
use educonnect_relay::transport::start_websocket_server;
use educonnect_relay::utils::logging;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logging::init("info");

    if let Err(e) = run_server().await {
        error!("Relay failed: {e}");
    }
}

async fn run_server() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let store = MessageStore::open(
        &config.relay.db_path,
        Some(config.relay.message_ttl_secs as i64),
        Some(config.relay.max_messages_per_conversation),
    )?;
    let relay = Arc::new(Mutex::new(Relay::new_with_store(store)));

    tokio::select! {
        _ = start_websocket_server(addr, relay) => {
            error!("WebSocket server exited unexpectedly.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    Ok(())
}
