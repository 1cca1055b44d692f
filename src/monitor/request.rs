//! Check request decoding
//!
//! Two validation strategies over the same untrusted JSON value:
//!
//! - [`ValidationMode::Presence`]: the four required top-level fields must be
//!   present and truthy; unknown keys pass through.
//! - [`ValidationMode::Strict`]: explicit schema walk that rejects unknown
//!   keys and wrong types, and reports every failing field in one combined
//!   diagnostic.
//!
//! Both modes are all-or-nothing: no partially built request escapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Input to a freshness check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRequest {
    pub bucket: String,
    pub object: String,
    pub max_age_hours: f64,
    pub alert: AlertSpec,
}

/// The notification to send if the object turns out stale. Semantics of
/// `topic`/`priority` values are owned by the push endpoint, not validated
/// here beyond presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSpec {
    pub topic: String,
    pub priority: String,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Required fields present and truthy; extra keys tolerated.
    Presence,
    /// Unknown keys rejected, all field errors aggregated.
    Strict,
}

/// Rejected request; the message lists the offending field(s).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct InvalidRequest(pub String);

const TOP_FIELDS: [&str; 4] = ["bucket", "object", "max_age_hours", "alert"];
const ALERT_FIELDS: [&str; 4] = ["topic", "priority", "title", "message"];

pub fn decode_request(body: &Value, mode: ValidationMode) -> Result<CheckRequest, InvalidRequest> {
    match mode {
        ValidationMode::Presence => decode_presence(body),
        ValidationMode::Strict => decode_strict(body),
    }
}

fn decode_presence(body: &Value) -> Result<CheckRequest, InvalidRequest> {
    let Some(obj) = body.as_object() else {
        return Err(InvalidRequest(
            "request body must be a JSON object".to_string(),
        ));
    };

    let all_present = TOP_FIELDS
        .iter()
        .all(|field| obj.get(*field).is_some_and(truthy));
    if !all_present {
        return Err(InvalidRequest("missing required fields".to_string()));
    }

    serde_json::from_value(body.clone()).map_err(|e| InvalidRequest(e.to_string()))
}

fn decode_strict(body: &Value) -> Result<CheckRequest, InvalidRequest> {
    let Some(obj) = body.as_object() else {
        return Err(InvalidRequest(
            "request body must be a JSON object".to_string(),
        ));
    };

    let mut errors = Vec::new();

    for key in obj.keys() {
        if !TOP_FIELDS.contains(&key.as_str()) {
            errors.push(format!("unknown field `{key}`"));
        }
    }

    let bucket = non_empty_string(obj, "bucket", "bucket", &mut errors);
    let object = non_empty_string(obj, "object", "object", &mut errors);

    let max_age_hours = match obj.get("max_age_hours") {
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v > 0.0 => Some(v),
            _ => {
                errors.push("`max_age_hours` must be a positive number".to_string());
                None
            }
        },
        Some(_) => {
            errors.push("`max_age_hours` must be a positive number".to_string());
            None
        }
        None => {
            errors.push("missing field `max_age_hours`".to_string());
            None
        }
    };

    let alert = match obj.get("alert") {
        Some(Value::Object(fields)) => {
            for key in fields.keys() {
                if !ALERT_FIELDS.contains(&key.as_str()) {
                    errors.push(format!("unknown field `alert.{key}`"));
                }
            }
            let topic = non_empty_string(fields, "topic", "alert.topic", &mut errors);
            let priority = non_empty_string(fields, "priority", "alert.priority", &mut errors);
            let title = non_empty_string(fields, "title", "alert.title", &mut errors);
            let message = non_empty_string(fields, "message", "alert.message", &mut errors);
            match (topic, priority, title, message) {
                (Some(topic), Some(priority), Some(title), Some(message)) => Some(AlertSpec {
                    topic,
                    priority,
                    title,
                    message,
                }),
                _ => None,
            }
        }
        Some(_) => {
            errors.push("`alert` must be an object".to_string());
            None
        }
        None => {
            errors.push("missing field `alert`".to_string());
            None
        }
    };

    match (bucket, object, max_age_hours, alert) {
        (Some(bucket), Some(object), Some(max_age_hours), Some(alert)) if errors.is_empty() => {
            Ok(CheckRequest {
                bucket,
                object,
                max_age_hours,
                alert,
            })
        }
        _ => Err(InvalidRequest(errors.join(", "))),
    }
}

fn non_empty_string(
    obj: &serde_json::Map<String, Value>,
    field: &str,
    label: &str,
    errors: &mut Vec<String>,
) -> Option<String> {
    match obj.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(_) => {
            errors.push(format!("`{label}` must be a non-empty string"));
            None
        }
        None => {
            errors.push(format!("missing field `{label}`"));
            None
        }
    }
}

// JS-style truthiness, preserved for the presence-only entry point.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_body() -> Value {
        json!({
            "bucket": "backups",
            "object": "db.sql.gz",
            "max_age_hours": 24.0,
            "alert": {
                "topic": "ops",
                "priority": "5",
                "title": "Backup stale",
                "message": "nightly backup is stale"
            }
        })
    }

    #[test]
    fn test_strict_accepts_valid_body() {
        let request = decode_request(&valid_body(), ValidationMode::Strict).unwrap();
        assert_eq!(request.bucket, "backups");
        assert_eq!(request.max_age_hours, 24.0);
        assert_eq!(request.alert.topic, "ops");
    }

    #[test]
    fn test_strict_rejects_unknown_top_level_key() {
        let mut body = valid_body();
        body["extra"] = json!("surprise");
        let err = decode_request(&body, ValidationMode::Strict).unwrap_err();
        assert!(err.0.contains("unknown field `extra`"), "{}", err.0);
    }

    #[test]
    fn test_strict_rejects_unknown_alert_key() {
        let mut body = valid_body();
        body["alert"]["color"] = json!("red");
        let err = decode_request(&body, ValidationMode::Strict).unwrap_err();
        assert!(err.0.contains("unknown field `alert.color`"), "{}", err.0);
    }

    #[test]
    fn test_strict_aggregates_all_field_errors() {
        let body = json!({
            "object": "db.sql.gz",
            "max_age_hours": "24",
            "alert": {
                "topic": "ops",
                "priority": "5",
                "title": "Backup stale",
                "message": "nightly backup is stale"
            }
        });
        let err = decode_request(&body, ValidationMode::Strict).unwrap_err();
        assert!(err.0.contains("missing field `bucket`"), "{}", err.0);
        assert!(
            err.0.contains("`max_age_hours` must be a positive number"),
            "{}",
            err.0
        );
    }

    #[test]
    fn test_strict_rejects_non_positive_threshold() {
        let mut body = valid_body();
        body["max_age_hours"] = json!(0);
        assert!(decode_request(&body, ValidationMode::Strict).is_err());

        body["max_age_hours"] = json!(-2.5);
        assert!(decode_request(&body, ValidationMode::Strict).is_err());
    }

    #[test]
    fn test_strict_rejects_empty_strings() {
        let mut body = valid_body();
        body["bucket"] = json!("");
        let err = decode_request(&body, ValidationMode::Strict).unwrap_err();
        assert!(err.0.contains("`bucket` must be a non-empty string"), "{}", err.0);
    }

    #[test]
    fn test_strict_rejects_null_body() {
        assert!(decode_request(&Value::Null, ValidationMode::Strict).is_err());
        assert!(decode_request(&json!([1, 2]), ValidationMode::Strict).is_err());
    }

    #[test]
    fn test_presence_accepts_extra_keys() {
        let mut body = valid_body();
        body["extra"] = json!("tolerated");
        let request = decode_request(&body, ValidationMode::Presence).unwrap();
        assert_eq!(request.object, "db.sql.gz");
    }

    #[test]
    fn test_presence_rejects_missing_field() {
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove("alert");
        let err = decode_request(&body, ValidationMode::Presence).unwrap_err();
        assert_eq!(err.0, "missing required fields");
    }

    #[test]
    fn test_presence_rejects_zero_threshold() {
        // 0 is falsy, so presence validation treats it as absent.
        let mut body = valid_body();
        body["max_age_hours"] = json!(0);
        let err = decode_request(&body, ValidationMode::Presence).unwrap_err();
        assert_eq!(err.0, "missing required fields");
    }

    #[test]
    fn test_presence_rejects_null_body() {
        let err = decode_request(&Value::Null, ValidationMode::Presence).unwrap_err();
        assert_eq!(err.0, "request body must be a JSON object");
    }

    #[test]
    fn test_presence_rejects_mistyped_alert() {
        // Present and truthy but missing a nested field: the typed decode
        // still has to fail rather than hand back a partial request.
        let mut body = valid_body();
        body["alert"].as_object_mut().unwrap().remove("message");
        let err = decode_request(&body, ValidationMode::Presence).unwrap_err();
        assert!(err.0.contains("message"), "{}", err.0);
    }
}
