//! Event broker collaborator
//!
//! The check pipeline publishes alert events through [`EventBus`]; delivery
//! to the relay (at-least-once, with redelivery on failure) is the broker's
//! concern, so this side only reports whether the publish call was accepted.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::event::{AlertEvent, PushEnvelope};

#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, topic: &str, event: &AlertEvent) -> Result<(), PublishError>;
}

/// Broker collaborator errors
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("publish request failed: {0}")]
    Network(String),

    #[error("publish rejected: {0}")]
    Rejected(String),
}

/// In-memory bus that records published events (tests, local runs).
#[derive(Default)]
pub struct MemoryBus {
    published: RwLock<Vec<(String, AlertEvent)>>,
    fail: bool,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bus whose publish call always fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn published(&self) -> Vec<(String, AlertEvent)> {
        self.published.read().clone()
    }
}

#[async_trait]
impl EventBus for MemoryBus {
    async fn publish(&self, topic: &str, event: &AlertEvent) -> Result<(), PublishError> {
        if self.fail {
            return Err(PublishError::Rejected("publish disabled".to_string()));
        }
        self.published
            .write()
            .push((topic.to_string(), event.clone()));
        Ok(())
    }
}

/// Bus that wraps each event in a push envelope and POSTs it straight to a
/// subscriber endpoint, the same shape a push subscription would deliver.
/// The topic only routes on the broker side; one bus serves one endpoint.
pub struct HttpPushBus {
    endpoint: String,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpPushBus {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl EventBus for HttpPushBus {
    async fn publish(&self, topic: &str, event: &AlertEvent) -> Result<(), PublishError> {
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let envelope = PushEnvelope::wrap(
            event,
            message_id.to_string(),
            chrono::Utc::now().to_rfc3339(),
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| PublishError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PublishError::Rejected(format!(
                "subscriber returned {}",
                response.status()
            )));
        }

        tracing::debug!(topic, message_id, "alert event delivered");
        Ok(())
    }
}
