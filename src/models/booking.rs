use serde::{Deserialize, Serialize};

use super::booking_time::{parse_booking_time, NormalizedMoment, RawBookingTime};

pub const GUEST_NAME: &str = "Guest";

/// A booking as returned by the backend. Any field may be missing; a
/// missing or `null` status reads as PENDING.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub id: Option<i64>,
    #[serde(default)]
    pub booking_time: Option<RawBookingTime>,
    #[serde(default, deserialize_with = "status_or_pending")]
    pub status: BookingStatus,
    #[serde(default)]
    pub user: Option<BookingUser>,
    #[serde(default)]
    pub service: Option<ServiceRef>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Completed => "COMPLETED",
        }
    }

    /// Everything except a cancellation holds its slot.
    pub fn occupies_slot(&self) -> bool {
        *self != BookingStatus::Cancelled
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingUser {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRef {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    pub price: Option<f64>,
}

impl BookingRecord {
    pub fn is_active(&self) -> bool {
        self.status.occupies_slot()
    }

    pub fn moment(&self) -> Option<NormalizedMoment> {
        parse_booking_time(self.booking_time.as_ref())
    }

    /// `fullName`, then `username`, then [`GUEST_NAME`]; blank names are skipped.
    pub fn display_name(&self) -> String {
        self.user
            .as_ref()
            .and_then(|u| {
                non_blank(u.full_name.as_deref()).or_else(|| non_blank(u.username.as_deref()))
            })
            .unwrap_or(GUEST_NAME)
            .to_string()
    }

    pub fn service_name(&self) -> Option<&str> {
        self.service.as_ref().and_then(|s| non_blank(s.name.as_deref()))
    }
}

fn status_or_pending<'de, D>(deserializer: D) -> Result<BookingStatus, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<BookingStatus>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// `POST /bookings` body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub user: IdRef,
    pub service: IdRef,
    pub booking_time: String,
    pub status: BookingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct IdRef {
    pub id: Option<i64>,
}

impl NewBooking {
    /// Always PENDING; `booking_time` is `{date}T{time}:00`.
    pub fn pending(
        user_id: Option<i64>,
        service_id: i64,
        date: &str,
        time: &str,
        notes: Option<String>,
    ) -> Self {
        Self {
            user: IdRef { id: user_id },
            service: IdRef {
                id: Some(service_id),
            },
            booking_time: format!("{date}T{time}:00"),
            status: BookingStatus::Pending,
            notes: notes.filter(|n| !n.trim().is_empty()),
        }
    }

    /// Local stand-in for a created booking whose response body could not be read.
    pub fn to_record(&self) -> BookingRecord {
        BookingRecord {
            id: None,
            booking_time: Some(RawBookingTime::Text(self.booking_time.clone())),
            status: self.status,
            user: Some(BookingUser {
                id: self.user.id,
                ..Default::default()
            }),
            service: Some(ServiceRef {
                id: self.service.id,
                ..Default::default()
            }),
            notes: self.notes.clone(),
        }
    }
}
