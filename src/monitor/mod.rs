//! Freshness check pipeline
//!
//! One shared pipeline behind both check entry points: decode the request,
//! resolve the alert-bus topic, fetch the object's last-modified timestamp,
//! evaluate its age, and publish at most one alert event when it is stale.
//! The two entry points differ only in validation mode and log wording.

pub mod freshness;
pub mod request;

pub use freshness::{evaluate, Freshness};
pub use request::{AlertSpec, CheckRequest, InvalidRequest, ValidationMode};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::broker::EventBus;
use crate::config::{ConfigError, ConfigSource, NTFY_TOPIC_ID};
use crate::event::AlertEvent;
use crate::storage::ObjectStore;

/// Which check entry point is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    Backup,
    Freshness,
}

impl CheckKind {
    pub fn validation_mode(self) -> ValidationMode {
        match self {
            CheckKind::Backup => ValidationMode::Presence,
            CheckKind::Freshness => ValidationMode::Strict,
        }
    }

    fn ok_prefix(self) -> &'static str {
        match self {
            CheckKind::Backup => "Backup OK",
            CheckKind::Freshness => "OK",
        }
    }

    fn subject_prefix(self) -> &'static str {
        match self {
            CheckKind::Backup => "backup ",
            CheckKind::Freshness => "",
        }
    }
}

/// Success value of one check invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    pub status: CheckStatus,
    pub age_hours: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Ok,
    AlertSent,
}

/// Check pipeline errors. The tag, not the message, decides the HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("upstream error: {0}")]
    Upstream(String),
}

/// Run one freshness check. Steps are strictly sequential; the publish call
/// happens at most once, only on the stale path, and its failure aborts the
/// invocation before any `alert_sent` report is produced.
pub async fn run_check(
    kind: CheckKind,
    body: &serde_json::Value,
    config: &ConfigSource,
    store: &dyn ObjectStore,
    bus: &dyn EventBus,
) -> Result<CheckReport, CheckError> {
    let request = request::decode_request(body, kind.validation_mode())
        .map_err(|e| CheckError::Validation(e.0))?;

    let alert_topic = config.require_one(NTFY_TOPIC_ID)?;

    let metadata = store
        .metadata(&request.bucket, &request.object)
        .await
        .map_err(|e| CheckError::Upstream(e.to_string()))?;

    let verdict = freshness::evaluate(Utc::now(), metadata.last_modified, request.max_age_hours);
    if verdict.age_hours < 0.0 {
        tracing::warn!(
            bucket = %request.bucket,
            object = %request.object,
            age_hours = verdict.age_hours,
            "last-modified timestamp is in the future"
        );
    }

    if verdict.stale {
        let event = AlertEvent::from_spec(&request.alert);
        bus.publish(&alert_topic, &event)
            .await
            .map_err(|e| CheckError::Upstream(e.to_string()))?;
        tracing::info!(
            "Alert sent: {}{}/{} is {:.1}h old (threshold: {}h)",
            kind.subject_prefix(),
            request.bucket,
            request.object,
            verdict.age_hours,
            request.max_age_hours
        );
        Ok(CheckReport {
            status: CheckStatus::AlertSent,
            age_hours: verdict.age_hours,
        })
    } else {
        tracing::info!(
            "{}: {}/{} is {:.1}h old",
            kind.ok_prefix(),
            request.bucket,
            request.object,
            verdict.age_hours
        );
        Ok(CheckReport {
            status: CheckStatus::Ok,
            age_hours: verdict.age_hours,
        })
    }
}
