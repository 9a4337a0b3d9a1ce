use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::errors::AppError;
use crate::models::{AvailabilityView, BookingDraft, BookingRecord, BookingStep, TimeGrid};
use crate::services::calendar::{classify_day, DayState};
use crate::services::gateway::{BookingBackend, DateRange};

/// One customer booking attempt for a single service.
///
/// Selections are checked against the local availability snapshot, which may
/// be stale; the backend still has the final word on `submit`.
pub struct BookingWorkflow {
    service_id: i64,
    today: NaiveDate,
    grid: &'static TimeGrid,
    bookings: Vec<BookingRecord>,
    view: AvailabilityView,
    server_full_dates: BTreeSet<String>,
    draft: BookingDraft,
    step: BookingStep,
    last_error: Option<String>,
    confirmed: Option<BookingRecord>,
}

impl BookingWorkflow {
    pub fn new(service_id: i64, today: NaiveDate) -> Self {
        Self {
            service_id,
            today,
            grid: TimeGrid::standard(),
            bookings: Vec::new(),
            view: AvailabilityView::default(),
            server_full_dates: BTreeSet::new(),
            draft: BookingDraft::default(),
            step: BookingStep::SelectingDate,
            last_error: None,
            confirmed: None,
        }
    }

    /// Loads availability: the store-wide booking list when the store is
    /// known, the server's full dates for this service otherwise.
    pub async fn prepare(
        &mut self,
        backend: &dyn BookingBackend,
        store_id: Option<i64>,
        range: DateRange,
    ) {
        match store_id {
            Some(store_id) => {
                let bookings = backend
                    .fetch_bookings_for_store_in_range(store_id, range.start, range.end)
                    .await;
                self.server_full_dates.clear();
                self.load_snapshot(bookings);
            }
            None => match backend.fetch_full_dates(self.service_id, Some(range)).await {
                Ok(dates) => self.server_full_dates = dates.into_iter().collect(),
                Err(e) => {
                    tracing::warn!(service_id = self.service_id, error = %e, "failed to fetch availability");
                    self.server_full_dates.clear();
                }
            },
        }
    }

    /// Replaces the availability snapshot and recomputes the view.
    pub fn load_snapshot(&mut self, bookings: Vec<BookingRecord>) {
        self.bookings = bookings;
        self.rebuild_view();
    }

    pub fn set_server_full_dates(&mut self, dates: impl IntoIterator<Item = String>) {
        self.server_full_dates = dates.into_iter().collect();
    }

    fn rebuild_view(&mut self) {
        self.view = AvailabilityView::build(&self.bookings, self.grid);
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn view(&self) -> &AvailabilityView {
        &self.view
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn confirmed(&self) -> Option<&BookingRecord> {
        self.confirmed.as_ref()
    }

    pub fn unavailable_dates(&self) -> BTreeSet<String> {
        self.view
            .full_dates
            .union(&self.server_full_dates)
            .cloned()
            .collect()
    }

    pub fn day_state(&self, date: NaiveDate) -> DayState {
        classify_day(date, self.today, &self.unavailable_dates())
    }

    /// Free grid slots of the selected date; empty before a date is chosen.
    pub fn available_times(&self) -> Vec<&str> {
        match &self.draft.date {
            Some(date) => self.view.available_times(date, self.grid),
            None => Vec::new(),
        }
    }

    /// Returns `false` (and changes nothing) for past or full dates.
    /// Picking a different date clears the chosen time.
    pub fn select_date(&mut self, date: NaiveDate) -> bool {
        if !self.step.accepts_input() {
            return false;
        }

        let state = self.day_state(date);
        if !state.is_selectable() {
            tracing::debug!(%date, ?state, "date not selectable");
            return false;
        }

        let key = date.format("%Y-%m-%d").to_string();
        if self.draft.date.as_deref() != Some(key.as_str()) {
            self.draft.time = None;
            self.draft.date = Some(key);
        }
        self.step = if self.draft.time.is_some() {
            BookingStep::ReviewingNotes
        } else {
            BookingStep::SelectingTime
        };
        true
    }

    /// Returns `false` (and changes nothing) without a date, for a time
    /// outside the grid, or for a slot the snapshot shows as reserved.
    pub fn select_time(&mut self, time: &str) -> bool {
        if !self.step.accepts_input() {
            return false;
        }

        let Some(date) = self.draft.date.as_deref() else {
            return false;
        };
        if !self.grid.contains(time) {
            tracing::debug!(time, "time is not a bookable slot");
            return false;
        }
        if self.view.is_reserved(date, time) {
            tracing::debug!(date, time, "slot already reserved");
            return false;
        }

        self.draft.time = Some(time.to_string());
        self.step = BookingStep::ReviewingNotes;
        true
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) -> bool {
        if !self.step.accepts_input() {
            return false;
        }
        self.draft.notes = notes.into();
        true
    }

    pub fn can_submit(&self) -> bool {
        self.step.accepts_input() && self.draft.is_complete()
    }

    /// Sends the booking once. On failure the draft is left untouched, the
    /// step returns to `ReviewingNotes` and the message is kept for display.
    pub async fn submit(
        &mut self,
        backend: &dyn BookingBackend,
    ) -> Result<&BookingRecord, AppError> {
        match self.step {
            BookingStep::Submitting => {
                return Err(AppError::InvalidSelection(
                    "a booking is already being submitted".to_string(),
                ))
            }
            BookingStep::Confirmed => {
                return Err(AppError::InvalidSelection(
                    "this booking is already confirmed".to_string(),
                ))
            }
            _ => {}
        }

        let (Some(date), Some(time)) = (self.draft.date.clone(), self.draft.time.clone()) else {
            return Err(AppError::InvalidSelection(
                "choose a date and time first".to_string(),
            ));
        };

        let notes = Some(self.draft.notes.clone()).filter(|n| !n.trim().is_empty());
        self.step = BookingStep::Submitting;
        self.last_error = None;

        match backend
            .create_booking(self.service_id, &date, &time, notes)
            .await
        {
            Ok(record) => {
                self.bookings.push(record.clone());
                self.rebuild_view();
                self.step = BookingStep::Confirmed;
                Ok(self.confirmed.insert(record))
            }
            Err(e) => {
                tracing::warn!(service_id = self.service_id, %date, %time, error = %e, "booking failed");
                self.last_error = Some(e.user_message());
                self.step = BookingStep::ReviewingNotes;
                Err(e)
            }
        }
    }

    /// Starts a fresh attempt; the availability snapshot is kept.
    pub fn reset(&mut self) {
        self.draft = BookingDraft::default();
        self.step = BookingStep::SelectingDate;
        self.last_error = None;
        self.confirmed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn booking(time: &str, status: &str) -> BookingRecord {
        serde_json::from_value(json!({
            "id": 1,
            "bookingTime": time,
            "status": status,
            "user": {"fullName": "Alice"}
        }))
        .unwrap()
    }

    fn workflow() -> BookingWorkflow {
        BookingWorkflow::new(7, date("2024-06-01"))
    }

    #[test]
    fn test_starts_selecting_date() {
        let wf = workflow();
        assert_eq!(wf.step(), BookingStep::SelectingDate);
        assert!(wf.available_times().is_empty());
        assert!(!wf.can_submit());
    }

    #[test]
    fn test_time_requires_date() {
        let mut wf = workflow();
        assert!(!wf.select_time("10:00"));
        assert_eq!(wf.draft().time, None);
    }

    #[test]
    fn test_happy_path_steps() {
        let mut wf = workflow();
        assert!(wf.select_date(date("2024-06-03")));
        assert_eq!(wf.step(), BookingStep::SelectingTime);
        assert!(wf.select_time("10:00"));
        assert_eq!(wf.step(), BookingStep::ReviewingNotes);
        assert!(wf.set_notes("first visit"));
        assert!(wf.can_submit());
    }

    #[test]
    fn test_reserved_slot_is_rejected() {
        let mut wf = workflow();
        wf.load_snapshot(vec![booking("2024-06-03T10:00:00", "PENDING")]);
        assert!(wf.select_date(date("2024-06-03")));

        assert!(!wf.select_time("10:00"));
        assert_eq!(wf.draft().time, None);
        assert!(!wf.available_times().contains(&"10:00"));
        assert!(wf.select_time("10:30"));
    }

    #[test]
    fn test_cancelled_slot_is_offered() {
        let mut wf = workflow();
        wf.load_snapshot(vec![booking("2024-06-03T10:00:00", "CANCELLED")]);
        wf.select_date(date("2024-06-03"));
        assert!(wf.select_time("10:00"));
    }

    #[test]
    fn test_time_outside_grid_is_rejected() {
        let mut wf = workflow();
        wf.select_date(date("2024-06-03"));
        assert!(!wf.select_time("20:00"));
        assert!(!wf.select_time("10:15"));
    }

    #[test]
    fn test_changing_date_clears_time() {
        let mut wf = workflow();
        wf.select_date(date("2024-06-03"));
        wf.select_time("14:00");
        assert!(wf.select_date(date("2024-06-04")));
        assert_eq!(wf.draft().date.as_deref(), Some("2024-06-04"));
        assert_eq!(wf.draft().time, None);
        assert_eq!(wf.step(), BookingStep::SelectingTime);
    }

    #[test]
    fn test_reselecting_same_date_keeps_time() {
        let mut wf = workflow();
        wf.select_date(date("2024-06-03"));
        wf.select_time("14:00");
        assert!(wf.select_date(date("2024-06-03")));
        assert_eq!(wf.draft().time.as_deref(), Some("14:00"));
        assert_eq!(wf.step(), BookingStep::ReviewingNotes);
    }

    #[test]
    fn test_past_and_full_dates_are_rejected() {
        let mut wf = workflow();
        wf.set_server_full_dates(vec!["2024-06-05".to_string()]);
        assert!(!wf.select_date(date("2024-05-31")));
        assert!(!wf.select_date(date("2024-06-05")));
        assert_eq!(wf.draft().date, None);
        assert!(wf.select_date(date("2024-06-01")));
    }

    #[test]
    fn test_locally_full_date_is_unavailable() {
        let bookings = TimeGrid::standard()
            .slots()
            .iter()
            .map(|slot| booking(&format!("2024-06-06T{slot}:00"), "CONFIRMED"))
            .collect();
        let mut wf = workflow();
        wf.load_snapshot(bookings);
        assert_eq!(wf.day_state(date("2024-06-06")), DayState::Unavailable);
        assert!(!wf.select_date(date("2024-06-06")));
    }
}
