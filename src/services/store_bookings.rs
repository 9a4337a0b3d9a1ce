use serde::Serialize;

use crate::errors::AppError;
use crate::models::{AvailabilityView, BookingRecord, BookingStatus, TimeGrid};
use crate::services::gateway::{BookingBackend, DateRange};

/// One grid slot of a day with whoever holds it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotEntry {
    pub time: String,
    pub occupants: Vec<String>,
}

impl SlotEntry {
    pub fn is_free(&self) -> bool {
        self.occupants.is_empty()
    }
}

/// The owner's snapshot of a store's bookings over a date range.
pub struct StoreBookings {
    store_id: i64,
    range: DateRange,
    grid: &'static TimeGrid,
    bookings: Vec<BookingRecord>,
    view: AvailabilityView,
}

impl StoreBookings {
    pub fn from_bookings(store_id: i64, range: DateRange, bookings: Vec<BookingRecord>) -> Self {
        let grid = TimeGrid::standard();
        let view = AvailabilityView::build(&bookings, grid);
        Self {
            store_id,
            range,
            grid,
            bookings,
            view,
        }
    }

    pub async fn load(backend: &dyn BookingBackend, store_id: i64, range: DateRange) -> Self {
        let bookings = backend
            .fetch_bookings_for_store_in_range(store_id, range.start, range.end)
            .await;
        Self::from_bookings(store_id, range, bookings)
    }

    pub async fn refresh(&mut self, backend: &dyn BookingBackend) {
        self.bookings = backend
            .fetch_bookings_for_store_in_range(self.store_id, self.range.start, self.range.end)
            .await;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.view = AvailabilityView::build(&self.bookings, self.grid);
    }

    pub fn store_id(&self) -> i64 {
        self.store_id
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn bookings(&self) -> &[BookingRecord] {
        &self.bookings
    }

    pub fn view(&self) -> &AvailabilityView {
        &self.view
    }

    /// Every grid slot of `date`, in order.
    pub fn day_schedule(&self, date: &str) -> Vec<SlotEntry> {
        self.grid
            .slots()
            .iter()
            .map(|time| SlotEntry {
                time: time.clone(),
                occupants: self.view.occupants(date, time).to_vec(),
            })
            .collect()
    }

    /// Active bookings on `date`, earliest first.
    pub fn bookings_on(&self, date: &str) -> Vec<&BookingRecord> {
        let mut found: Vec<_> = self
            .bookings
            .iter()
            .filter(|b| b.is_active())
            .filter_map(|b| b.moment().filter(|m| m.date == date).map(|m| (m.time, b)))
            .collect();
        found.sort_by(|a, b| a.0.cmp(&b.0));
        found.into_iter().map(|(_, b)| b).collect()
    }

    /// Deletes the booking on the backend, then drops it from the snapshot.
    /// On failure the snapshot is left as it was.
    pub async fn dismiss(
        &mut self,
        backend: &dyn BookingBackend,
        booking_id: i64,
    ) -> Result<(), AppError> {
        backend.delete_booking(booking_id).await?;
        self.bookings.retain(|b| b.id != Some(booking_id));
        self.rebuild();
        tracing::info!(store_id = self.store_id, booking_id, "booking dismissed");
        Ok(())
    }

    /// Patches the status to CANCELLED, then mirrors it locally.
    pub async fn cancel(
        &mut self,
        backend: &dyn BookingBackend,
        booking_id: i64,
    ) -> Result<(), AppError> {
        backend
            .update_status(booking_id, BookingStatus::Cancelled)
            .await?;
        for booking in self.bookings.iter_mut().filter(|b| b.id == Some(booking_id)) {
            booking.status = BookingStatus::Cancelled;
        }
        self.rebuild();
        tracing::info!(store_id = self.store_id, booking_id, "booking cancelled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn range() -> DateRange {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        DateRange::upcoming(day, 7)
    }

    fn booking(id: i64, time: &str, name: &str) -> BookingRecord {
        serde_json::from_value(json!({
            "id": id,
            "bookingTime": time,
            "status": "PENDING",
            "user": {"fullName": name}
        }))
        .unwrap()
    }

    #[test]
    fn test_day_schedule_covers_grid() {
        let snapshot = StoreBookings::from_bookings(
            1,
            range(),
            vec![
                booking(1, "2024-06-01T10:00:00", "Alice"),
                booking(2, "2024-06-01T10:00:00", "Bob"),
            ],
        );
        let schedule = snapshot.day_schedule("2024-06-01");
        assert_eq!(schedule.len(), 22);

        let ten = schedule.iter().find(|s| s.time == "10:00").unwrap();
        assert_eq!(ten.occupants, vec!["Alice", "Bob"]);
        assert_eq!(schedule.iter().filter(|s| s.is_free()).count(), 21);
    }

    #[test]
    fn test_bookings_on_sorted() {
        let snapshot = StoreBookings::from_bookings(
            1,
            range(),
            vec![
                booking(1, "2024-06-01T15:00:00", "Late"),
                booking(2, "2024-06-02T09:00:00", "Other day"),
                booking(3, "2024-06-01T09:30:00", "Early"),
            ],
        );
        let ids: Vec<_> = snapshot.bookings_on("2024-06-01").iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![Some(3), Some(1)]);
    }
}
