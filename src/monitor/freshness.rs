//! Freshness evaluation

use chrono::{DateTime, Utc};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Outcome of comparing an object's age against its threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Freshness {
    pub age_hours: f64,
    pub stale: bool,
}

/// Compute the object's age in hours (wall-clock millisecond precision) and
/// decide whether it exceeds the threshold.
///
/// The comparison is strictly greater-than: an object exactly at the
/// threshold is still fresh. A last-modified timestamp in the future yields
/// a negative age and a non-stale verdict; callers surface that in telemetry.
pub fn evaluate(
    now: DateTime<Utc>,
    last_modified: DateTime<Utc>,
    max_age_hours: f64,
) -> Freshness {
    let age_hours =
        (now.timestamp_millis() - last_modified.timestamp_millis()) as f64 / MILLIS_PER_HOUR;
    Freshness {
        age_hours,
        stale: age_hours > max_age_hours,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    #[test]
    fn test_stale_when_older_than_threshold() {
        let now = at(1_700_000_000_000);
        let last_modified = now - Duration::hours(25);
        let verdict = evaluate(now, last_modified, 24.0);
        assert!(verdict.stale);
        assert_eq!(verdict.age_hours, 25.0);
    }

    #[test]
    fn test_fresh_when_younger_than_threshold() {
        let now = at(1_700_000_000_000);
        let last_modified = now - Duration::minutes(30);
        let verdict = evaluate(now, last_modified, 24.0);
        assert!(!verdict.stale);
        assert_eq!(verdict.age_hours, 0.5);
    }

    #[test]
    fn test_exact_threshold_is_still_fresh() {
        let now = at(1_700_000_000_000);
        let last_modified = now - Duration::hours(24);
        let verdict = evaluate(now, last_modified, 24.0);
        assert_eq!(verdict.age_hours, 24.0);
        assert!(!verdict.stale);
    }

    #[test]
    fn test_future_timestamp_yields_negative_age() {
        let now = at(1_700_000_000_000);
        let last_modified = now + Duration::hours(2);
        let verdict = evaluate(now, last_modified, 24.0);
        assert_eq!(verdict.age_hours, -2.0);
        assert!(!verdict.stale);
    }

    #[test]
    fn test_millisecond_precision() {
        let now = at(1_700_000_000_000);
        let last_modified = at(1_700_000_000_000 - 5_400_000); // 1.5h in millis
        let verdict = evaluate(now, last_modified, 1.0);
        assert_eq!(verdict.age_hours, 1.5);
        assert!(verdict.stale);
    }
}
