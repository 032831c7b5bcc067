use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tenant config key holding the ceremony date.
pub const WEDDING_DATE_KEY: &str = "weddingDate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub total_seconds: i64,
    pub is_past: bool,
}

/// Time left until `target`, clamped to zero once it has passed.
pub fn countdown_until(target: DateTime<Utc>, now: DateTime<Utc>) -> Countdown {
    let remaining = (target - now).num_seconds();
    if remaining <= 0 {
        return Countdown {
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
            total_seconds: 0,
            is_past: remaining < 0,
        };
    }

    Countdown {
        days: remaining / 86_400,
        hours: (remaining % 86_400) / 3_600,
        minutes: (remaining % 3_600) / 60,
        seconds: remaining % 60,
        total_seconds: remaining,
        is_past: false,
    }
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_wedding_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn wedding_date_from_config(config: Option<&Value>) -> Option<DateTime<Utc>> {
    config?
        .get(WEDDING_DATE_KEY)?
        .as_str()
        .and_then(parse_wedding_date)
}
