use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    check_backup, check_freshness, health_check, notification_received, relay_push, AppState,
};
use crate::broker::HttpPushBus;
use crate::config::ConfigSource;
use crate::relay::Forwarder;
use crate::storage::HttpObjectStore;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Object storage base URL (GCS JSON metadata API).
    pub store_url: String,
    /// Subscriber endpoint the alert bus pushes events to.
    pub alert_endpoint: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            store_url: "https://storage.googleapis.com".to_string(),
            alert_endpoint: "http://127.0.0.1:8080/events/alerts".to_string(),
        }
    }
}

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Check entry points
        .route("/check/backup", post(check_backup))
        .route("/check/freshness", post(check_freshness))
        // Event-triggered entry points
        .route("/events/alerts", post(relay_push))
        .route("/events/received", post(notification_received))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState {
        store: Arc::new(HttpObjectStore::new(config.store_url.clone())),
        bus: Arc::new(HttpPushBus::new(config.alert_endpoint.clone())),
        forwarder: Forwarder::new(),
        config: ConfigSource::Env,
    });

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Starting vigil server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Vigil server stopped");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");

    tracing::info!("Shutdown signal received");
}
