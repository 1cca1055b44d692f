//! Alert relay: event in, push notification out
//!
//! The second, independently-triggered half of the pipeline. The broker
//! delivers an alert event; the relay resolves its push credentials, builds
//! an authenticated request from the event's attributes, sends it, and
//! classifies the upstream response. Failures propagate so the broker's
//! redelivery mechanism retries the event; there is no retry loop here.

pub mod forwarder;

pub use forwarder::{DeliveryError, Forwarder, PushTarget, RelayOutcome};

use crate::config::ConfigSource;
use crate::event::AlertEvent;

/// Deliver one alert event: resolve the push target, then forward.
pub async fn deliver(
    event: &AlertEvent,
    config: &ConfigSource,
    forwarder: &Forwarder,
) -> Result<RelayOutcome, DeliveryError> {
    let target = PushTarget::resolve(config)?;
    forwarder.forward(event, &target).await
}
