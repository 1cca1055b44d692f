//! Alert event: the contract between the check pipeline and the relay
//!
//! The emitter and the relay never share code paths at runtime (they are
//! separate entry points bridged by the broker), so the attribute keys they
//! exchange live here as constants both sides compile against.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

use crate::monitor::AlertSpec;

/// Notification topic the relay routes on.
pub const ATTR_TOPIC: &str = "topic";
/// Notification priority, forwarded as the `Priority` header.
pub const ATTR_PRIORITY: &str = "priority";
/// Notification title, forwarded as the `Title` header when present.
pub const ATTR_TITLE: &str = "title";
/// Notification tags, forwarded as the `Tags` header when present.
pub const ATTR_TAGS: &str = "tags";

/// A single alert on the wire: opaque payload bytes plus string attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEvent {
    pub payload: Vec<u8>,
    pub attributes: HashMap<String, String>,
}

impl AlertEvent {
    pub fn new(payload: Vec<u8>, attributes: HashMap<String, String>) -> Self {
        Self {
            payload,
            attributes,
        }
    }

    /// Build the event the emitter publishes for an alert spec: payload is
    /// the message bytes, attributes carry topic/priority/title.
    pub fn from_spec(spec: &AlertSpec) -> Self {
        let mut attributes = HashMap::new();
        attributes.insert(ATTR_TOPIC.to_string(), spec.topic.clone());
        attributes.insert(ATTR_PRIORITY.to_string(), spec.priority.clone());
        attributes.insert(ATTR_TITLE.to_string(), spec.title.clone());
        Self {
            payload: spec.message.clone().into_bytes(),
            attributes,
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// The broker's push envelope: the flat shape a push subscription delivers
/// to an HTTP subscriber (base64 payload, string attributes, message id,
/// publish time).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEnvelope {
    pub data: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    pub message_id: String,
    pub publish_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid push envelope: {0}")]
pub struct EnvelopeError(String);

impl PushEnvelope {
    /// Wrap an event for push delivery.
    pub fn wrap(event: &AlertEvent, message_id: String, publish_time: String) -> Self {
        Self {
            data: BASE64.encode(&event.payload),
            attributes: event.attributes.clone(),
            message_id,
            publish_time,
        }
    }

    /// Recover the event, decoding the base64 payload.
    pub fn open(&self) -> Result<AlertEvent, EnvelopeError> {
        let payload = BASE64
            .decode(&self.data)
            .map_err(|e| EnvelopeError(e.to_string()))?;
        Ok(AlertEvent::new(payload, self.attributes.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> AlertSpec {
        AlertSpec {
            topic: "ops".to_string(),
            priority: "5".to_string(),
            title: "Disk full".to_string(),
            message: "disk at 95%".to_string(),
        }
    }

    #[test]
    fn test_from_spec_maps_fields() {
        let event = AlertEvent::from_spec(&spec());
        assert_eq!(event.payload, b"disk at 95%");
        assert_eq!(event.attr(ATTR_TOPIC), Some("ops"));
        assert_eq!(event.attr(ATTR_PRIORITY), Some("5"));
        assert_eq!(event.attr(ATTR_TITLE), Some("Disk full"));
        assert_eq!(event.attributes.len(), 3);
    }

    #[test]
    fn test_tags_absent_by_default() {
        let event = AlertEvent::from_spec(&spec());
        assert_eq!(event.attr(ATTR_TAGS), None);
    }

    #[test]
    fn test_envelope_round_trip() {
        let event = AlertEvent::from_spec(&spec());
        let envelope = PushEnvelope::wrap(&event, "42".to_string(), "2026-01-01T00:00:00Z".to_string());
        assert_eq!(envelope.data, "ZGlzayBhdCA5NSU=");
        assert_eq!(envelope.open().unwrap(), event);
    }

    #[test]
    fn test_envelope_rejects_bad_base64() {
        let envelope = PushEnvelope {
            data: "not base64!!!".to_string(),
            attributes: HashMap::new(),
            message_id: "1".to_string(),
            publish_time: "2026-01-01T00:00:00Z".to_string(),
        };
        assert!(envelope.open().is_err());
    }
}
