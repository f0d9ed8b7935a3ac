/// Initialize tracing/logging for the application.
///
/// The level comes from the `RELAY_LOG_LEVEL` environment variable when
/// set (picked up from `.env` via dotenvy in the binary), falling back to
/// `default_level`.
pub fn init(default_level: &str) {
    let level = std::env::var("RELAY_LOG_LEVEL").unwrap_or_else(|_| default_level.to_string());
    let lvl = match level.to_lowercase().as_str() {
        "error" => tracing::Level::ERROR,
        "warn" | "warning" => tracing::Level::WARN,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => tracing::Level::INFO,
    };

    // Use try_init so tests and libraries can call this multiple times without panicking
    let _ = tracing_subscriber::fmt()
        .with_max_level(lvl)
        .with_target(false)
        .try_init();
}
