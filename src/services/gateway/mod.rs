pub mod http;

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};

use crate::errors::AppError;
use crate::models::{BookingRecord, BookingStatus, NewBooking};

/// Source of the current session's bearer token and user id. The engine
/// never stores authentication state itself.
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
    fn user_id(&self) -> Option<i64>;
}

#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    pub token: Option<String>,
    pub user_id: Option<i64>,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>, user_id: Option<i64>) -> Self {
        let token = token.into();
        Self {
            token: (!token.is_empty()).then_some(token),
            user_id,
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }

    fn user_id(&self) -> Option<i64> {
        self.user_id
    }
}

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `today` through `today + days`, clamped to the last representable date.
    pub fn upcoming(today: NaiveDate, days: i64) -> Self {
        let end = Duration::try_days(days)
            .and_then(|span| today.checked_add_signed(span))
            .unwrap_or(NaiveDate::MAX);
        Self { start: today, end }
    }

    pub fn start_str(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// Every round trip to the booking backend. Each call is attempted once;
/// nothing here retries.
///
/// Listing calls degrade to an empty result on failure. Mutations fail with
/// [`AppError::Gateway`] carrying the backend's message.
#[async_trait]
pub trait BookingBackend: Send + Sync {
    /// Server-computed full dates for one service. `None` means the default window.
    async fn fetch_full_dates(
        &self,
        service_id: i64,
        range: Option<DateRange>,
    ) -> Result<Vec<String>, AppError>;

    async fn fetch_bookings_for_store_in_range(
        &self,
        store_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<BookingRecord>;

    async fn fetch_bookings_for_store_on_date(
        &self,
        store_id: i64,
        date: NaiveDate,
    ) -> Vec<BookingRecord>;

    async fn fetch_bookings_for_user(&self, user_id: i64) -> Vec<BookingRecord>;

    /// Submits a PENDING booking for the session's user. Not idempotent.
    async fn create_booking(
        &self,
        service_id: i64,
        date: &str,
        time: &str,
        notes: Option<String>,
    ) -> Result<BookingRecord, AppError>;

    async fn update_status(&self, booking_id: i64, status: BookingStatus) -> Result<(), AppError>;

    async fn delete_booking(&self, booking_id: i64) -> Result<(), AppError>;
}

/// Union of the full dates of several services. A service whose lookup fails
/// contributes nothing.
pub async fn fetch_full_dates_for_store(
    backend: &dyn BookingBackend,
    service_ids: &[i64],
    range: Option<DateRange>,
) -> Vec<String> {
    let mut all = BTreeSet::new();
    for &service_id in service_ids {
        match backend.fetch_full_dates(service_id, range).await {
            Ok(dates) => all.extend(dates),
            Err(e) => {
                tracing::warn!(service_id, error = %e, "full dates unavailable for service");
            }
        }
    }
    all.into_iter().collect()
}

/// Reserved `HH:MM` times of one store on one date.
pub async fn booked_times_for_store_date(
    backend: &dyn BookingBackend,
    store_id: i64,
    date: NaiveDate,
) -> Vec<String> {
    let bookings = backend.fetch_bookings_for_store_on_date(store_id, date).await;
    let key = date.format("%Y-%m-%d").to_string();
    crate::models::availability::booked_times_by_date(&bookings)
        .remove(&key)
        .map(|times| times.into_iter().collect())
        .unwrap_or_default()
}

/// Builds the payload `create_booking` implementations send.
pub fn new_booking_payload(
    credentials: &dyn CredentialProvider,
    service_id: i64,
    date: &str,
    time: &str,
    notes: Option<String>,
) -> NewBooking {
    NewBooking::pending(credentials.user_id(), service_id, date, time, notes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_upcoming_range() {
        let range = DateRange::upcoming(date("2024-01-30"), 30);
        assert_eq!(range.start_str(), "2024-01-30");
        assert_eq!(range.end_str(), "2024-02-29");
    }

    #[test]
    fn test_upcoming_huge_window_is_clamped() {
        let today = date("2026-10-19");
        assert_eq!(DateRange::upcoming(today, 100_000_000).end, NaiveDate::MAX);
        assert_eq!(DateRange::upcoming(today, i64::MAX).end, NaiveDate::MAX);
        assert_eq!(DateRange::upcoming(today, 0).end, today);
    }

    #[test]
    fn test_range_dates_inclusive() {
        let range = DateRange::new(date("2024-06-01"), date("2024-06-03"));
        let days: Vec<_> = range.dates().collect();
        assert_eq!(days, vec![date("2024-06-01"), date("2024-06-02"), date("2024-06-03")]);
    }

    #[test]
    fn test_empty_token_means_no_session() {
        let creds = StaticCredentials::new("", Some(1));
        assert_eq!(creds.bearer_token(), None);
        assert_eq!(creds.user_id(), Some(1));
    }

    #[test]
    fn test_payload_uses_session_user() {
        let creds = StaticCredentials::new("tok", Some(12));
        let payload = new_booking_payload(&creds, 3, "2024-06-01", "10:00", None);
        assert_eq!(payload.user.id, Some(12));
        assert_eq!(payload.service.id, Some(3));
        assert_eq!(payload.booking_time, "2024-06-01T10:00:00");
    }
}
