use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::broker::EventBus;
use crate::config::ConfigSource;
use crate::event::PushEnvelope;
use crate::monitor::{run_check, CheckError, CheckKind, CheckReport};
use crate::relay::{self, DeliveryError, Forwarder, RelayOutcome};
use crate::storage::ObjectStore;

/// Application state shared across handlers. Only `Arc`'d collaborators and
/// the config source live here; every invocation is otherwise independent.
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub bus: Arc<dyn EventBus>,
    pub forwarder: Forwarder,
    pub config: ConfigSource,
}

// ============================================================================
// Health Check
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Check entry points
// ============================================================================

pub async fn check_backup(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<CheckReport>, ApiError> {
    let report = run_check(
        CheckKind::Backup,
        &body,
        &state.config,
        state.store.as_ref(),
        state.bus.as_ref(),
    )
    .await?;
    Ok(Json(report))
}

pub async fn check_freshness(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<CheckReport>, ApiError> {
    let report = run_check(
        CheckKind::Freshness,
        &body,
        &state.config,
        state.store.as_ref(),
        state.bus.as_ref(),
    )
    .await?;
    Ok(Json(report))
}

// ============================================================================
// Relay entry point
// ============================================================================

pub async fn relay_push(
    State(state): State<Arc<AppState>>,
    Json(envelope): Json<PushEnvelope>,
) -> Result<Json<RelayOutcome>, ApiError> {
    let event = envelope
        .open()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let outcome = relay::deliver(&event, &state.config, &state.forwarder).await?;
    Ok(Json(outcome))
}

// ============================================================================
// Notification-received shim
// ============================================================================

/// Log-and-acknowledge sink for notification events; no branching beyond
/// envelope decode.
pub async fn notification_received(
    Json(envelope): Json<PushEnvelope>,
) -> Result<StatusCode, ApiError> {
    let event = envelope
        .open()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    tracing::info!(
        message_id = %envelope.message_id,
        publish_time = %envelope.publish_time,
        attributes = envelope.attributes.len(),
        payload_bytes = event.payload.len(),
        "notification received"
    );
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Error Handling
// ============================================================================

/// Transport-level error. Validation detail goes back to the caller;
/// config/upstream/delivery detail is logged, never echoed.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal,
}

impl From<CheckError> for ApiError {
    fn from(err: CheckError) -> Self {
        match err {
            CheckError::Validation(msg) => ApiError::BadRequest(msg),
            CheckError::Config(_) | CheckError::Upstream(_) => {
                tracing::error!(error = %err, "check failed");
                ApiError::Internal
            }
        }
    }
}

impl From<DeliveryError> for ApiError {
    fn from(err: DeliveryError) -> Self {
        // The 500 tells the push subscription to redeliver the event.
        tracing::error!(error = %err, "delivery failed");
        ApiError::Internal
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            ),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
