//! Outbound push delivery

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ConfigSource, NTFY_PASSWORD, NTFY_URL, NTFY_USER};
use crate::event::{AlertEvent, ATTR_PRIORITY, ATTR_TAGS, ATTR_TITLE, ATTR_TOPIC};

/// Routing segment when the event carries no `topic` attribute.
pub const DEFAULT_TOPIC: &str = "general";
/// Neutral priority when the event carries no `priority` attribute.
pub const DEFAULT_PRIORITY: &str = "3";

/// Resolved push endpoint credentials.
#[derive(Debug, Clone)]
pub struct PushTarget {
    pub base_url: String,
    pub user: String,
    pub password: String,
}

impl PushTarget {
    pub fn resolve(config: &ConfigSource) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: config.require_one(NTFY_URL)?,
            user: config.require_one(NTFY_USER)?,
            password: config.require_one(NTFY_PASSWORD)?,
        })
    }
}

/// Result of one delivery attempt. `success` is true only for upstream
/// [200, 300) responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayOutcome {
    pub success: bool,
    pub status_code: u16,
}

/// Delivery failures. All of them propagate to the trigger framework so the
/// event gets redelivered.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("push endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("push request failed: {0}")]
    Transport(String),
}

/// Sends alert events to the push endpoint.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
}

impl Forwarder {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Deliver one event: `POST {base}/{topic}` with basic auth, a
    /// `Priority` header, optional `Title`/`Tags` headers (omitted entirely
    /// when the event carries no such attribute), and the raw payload bytes
    /// as the body.
    pub async fn forward(
        &self,
        event: &AlertEvent,
        target: &PushTarget,
    ) -> Result<RelayOutcome, DeliveryError> {
        let topic = event.attr(ATTR_TOPIC).unwrap_or(DEFAULT_TOPIC);
        let url = format!("{}/{}", target.base_url.trim_end_matches('/'), topic);

        let mut request = self
            .client
            .post(&url)
            .basic_auth(&target.user, Some(&target.password))
            .header("Priority", event.attr(ATTR_PRIORITY).unwrap_or(DEFAULT_PRIORITY));
        if let Some(title) = event.attr(ATTR_TITLE) {
            request = request.header("Title", title);
        }
        if let Some(tags) = event.attr(ATTR_TAGS) {
            request = request.header("Tags", tags);
        }

        let response = request
            .body(event.payload.clone())
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!("Sent to ntfy/{}: {}", topic, preview(&event.payload));
        Ok(RelayOutcome {
            success: true,
            status_code: status.as_u16(),
        })
    }
}

impl Default for Forwarder {
    fn default() -> Self {
        Self::new()
    }
}

fn preview(payload: &[u8]) -> String {
    String::from_utf8_lossy(payload).chars().take(100).collect()
}
