use serde::Serialize;

use crate::errors::AppError;
use crate::models::{BookingRecord, BookingStatus};
use crate::services::gateway::BookingBackend;

pub const PREVIEW_LIMIT: usize = 5;
const MISSING: &str = "—";
const DEFAULT_SERVICE_NAME: &str = "Service";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingEntry {
    pub id: Option<i64>,
    pub date: String,
    pub time: String,
    pub service_name: String,
    pub status: BookingStatus,
}

impl From<&BookingRecord> for PendingEntry {
    fn from(record: &BookingRecord) -> Self {
        let (date, time) = match record.moment() {
            Some(m) => (m.date, m.time),
            None => (MISSING.to_string(), MISSING.to_string()),
        };
        Self {
            id: record.id,
            date,
            time,
            service_name: record
                .service_name()
                .unwrap_or(DEFAULT_SERVICE_NAME)
                .to_string(),
            status: record.status,
        }
    }
}

/// A user's bookings that are still open (not cancelled, not completed).
pub struct PendingBookings {
    user_id: i64,
    bookings: Vec<BookingRecord>,
}

fn is_open(record: &BookingRecord) -> bool {
    !matches!(
        record.status,
        BookingStatus::Cancelled | BookingStatus::Completed
    )
}

impl PendingBookings {
    pub fn from_bookings(user_id: i64, bookings: Vec<BookingRecord>) -> Self {
        Self {
            user_id,
            bookings: bookings.into_iter().filter(is_open).collect(),
        }
    }

    pub async fn load(backend: &dyn BookingBackend, user_id: i64) -> Self {
        let bookings = backend.fetch_bookings_for_user(user_id).await;
        Self::from_bookings(user_id, bookings)
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    pub fn entries(&self) -> Vec<PendingEntry> {
        self.bookings.iter().map(PendingEntry::from).collect()
    }

    /// The first [`PREVIEW_LIMIT`] entries and how many were left out.
    pub fn preview(&self) -> (Vec<PendingEntry>, usize) {
        let shown = self
            .bookings
            .iter()
            .take(PREVIEW_LIMIT)
            .map(PendingEntry::from)
            .collect();
        (shown, self.bookings.len().saturating_sub(PREVIEW_LIMIT))
    }

    /// User-initiated cancellation: status patch, then drop locally.
    pub async fn cancel(
        &mut self,
        backend: &dyn BookingBackend,
        booking_id: i64,
    ) -> Result<(), AppError> {
        backend
            .update_status(booking_id, BookingStatus::Cancelled)
            .await?;
        self.bookings.retain(|b| b.id != Some(booking_id));
        tracing::info!(user_id = self.user_id, booking_id, "booking cancelled by user");
        Ok(())
    }
}
