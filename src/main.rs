//! Vigil Server
//!
//! Run with: cargo run
//!
//! Environment variables:
//! - VIGIL_HOST: Bind address (default: 0.0.0.0)
//! - VIGIL_PORT: Port number (default: 8080)
//! - VIGIL_STORE_URL: Object storage base URL (default: https://storage.googleapis.com)
//! - VIGIL_ALERT_ENDPOINT: Subscriber endpoint alert events are pushed to
//!   (default: the relay route on this instance)
//! - RUST_LOG: Log level (default: info)
//!
//! Per-invocation settings, resolved by the pipelines rather than at startup:
//! - NTFY_TOPIC_ID: alert-bus topic for the check endpoints
//! - NTFY_URL, NTFY_USER, NTFY_PASSWORD: push endpoint for the relay

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vigil::api::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vigil=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse bootstrap configuration from environment
    let host = std::env::var("VIGIL_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("VIGIL_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let store_url = std::env::var("VIGIL_STORE_URL")
        .unwrap_or_else(|_| "https://storage.googleapis.com".to_string());
    let alert_endpoint = std::env::var("VIGIL_ALERT_ENDPOINT")
        .unwrap_or_else(|_| format!("http://127.0.0.1:{}/events/alerts", port));

    let config = ServerConfig {
        host,
        port,
        store_url,
        alert_endpoint,
    };

    tracing::info!("Vigil configuration:");
    tracing::info!("  Host: {}:{}", config.host, config.port);
    tracing::info!("  Object store: {}", config.store_url);
    tracing::info!("  Alert endpoint: {}", config.alert_endpoint);

    run_server(config).await
}
