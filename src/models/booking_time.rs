use serde::{Deserialize, Serialize};

/// `bookingTime` as the backend sends it: either an ISO local date-time
/// string or a `[year, month, day, hour, minute, ...]` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawBookingTime {
    Text(String),
    Parts(Vec<i64>),
    Unrecognized(serde_json::Value),
}

/// Canonical date and time of a booking, `YYYY-MM-DD` and `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NormalizedMoment {
    pub date: String,
    pub time: String,
}

impl NormalizedMoment {
    pub fn new(date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
        }
    }
}

impl RawBookingTime {
    pub fn from_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or(RawBookingTime::Unrecognized(value))
    }

    /// Returns `None` for anything that does not carry both a date and an
    /// `HH:MM` time. Never panics.
    pub fn normalize(&self) -> Option<NormalizedMoment> {
        match self {
            RawBookingTime::Text(s) => normalize_text(s),
            RawBookingTime::Parts(parts) => normalize_parts(parts),
            RawBookingTime::Unrecognized(_) => None,
        }
    }
}

/// Single entry point used by every aggregation site; a missing or `null`
/// timestamp normalizes to `None`.
pub fn parse_booking_time(raw: Option<&RawBookingTime>) -> Option<NormalizedMoment> {
    raw.and_then(RawBookingTime::normalize)
}

/// Dates in a full-dates listing come as `"YYYY-MM-DD"` or `[year, month, day]`.
pub fn normalize_date(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => {
            let date = s.trim().split('T').next().unwrap_or_default();
            (!date.is_empty()).then(|| date.to_string())
        }
        serde_json::Value::Array(parts) => {
            let mut numbers = parts.iter().map(serde_json::Value::as_i64);
            match (numbers.next(), numbers.next(), numbers.next()) {
                (Some(Some(year)), Some(Some(month)), Some(Some(day))) => {
                    Some(format!("{year}-{month:02}-{day:02}"))
                }
                _ => None,
            }
        }
        _ => None,
    }
}

fn normalize_text(s: &str) -> Option<NormalizedMoment> {
    let (date, time_part) = s.trim().split_once('T')?;
    // seconds and fractions are dropped
    let time = time_part.get(..5)?;
    if date.is_empty() || time.is_empty() {
        return None;
    }
    Some(NormalizedMoment::new(date, time))
}

fn normalize_parts(parts: &[i64]) -> Option<NormalizedMoment> {
    let [year, month, day, hour, minute, ..] = parts else {
        return None;
    };
    Some(NormalizedMoment::new(
        format!("{year}-{month:02}-{day:02}"),
        format!("{hour:02}:{minute:02}"),
    ))
}
