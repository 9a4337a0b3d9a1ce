use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::booking::BookingRecord;
use super::booking_time::NormalizedMoment;
use super::time_grid::TimeGrid;

pub type BookedTimesByDate = BTreeMap<String, BTreeSet<String>>;
pub type SlotOccupants = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Active bookings that carry a readable timestamp. Cancelled bookings and
/// malformed timestamps are dropped here and nowhere else.
fn active_moments(bookings: &[BookingRecord]) -> impl Iterator<Item = (&BookingRecord, NormalizedMoment)> {
    bookings.iter().filter(|b| b.is_active()).filter_map(|b| match b.moment() {
        Some(moment) => Some((b, moment)),
        None => {
            tracing::warn!(booking_id = ?b.id, "skipping booking with unreadable time");
            None
        }
    })
}

pub fn booked_times_by_date(bookings: &[BookingRecord]) -> BookedTimesByDate {
    let mut map = BookedTimesByDate::new();
    for (_, moment) in active_moments(bookings) {
        map.entry(moment.date).or_default().insert(moment.time);
    }
    map
}

/// Dates whose reserved-time count reaches `total_slot_count`.
pub fn full_dates(booked: &BookedTimesByDate, total_slot_count: usize) -> BTreeSet<String> {
    booked
        .iter()
        .filter(|(_, times)| times.len() >= total_slot_count)
        .map(|(date, _)| date.clone())
        .collect()
}

pub fn slot_occupants(bookings: &[BookingRecord]) -> SlotOccupants {
    let mut map = SlotOccupants::new();
    for (booking, moment) in active_moments(bookings) {
        push_occupant(&mut map, moment, booking.display_name());
    }
    map
}

fn push_occupant(map: &mut SlotOccupants, moment: NormalizedMoment, name: String) {
    let names = map.entry(moment.date).or_default().entry(moment.time).or_default();
    if !names.contains(&name) {
        names.push(name);
    }
}

/// Everything a screen derives from its availability snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AvailabilityView {
    pub booked_times_by_date: BookedTimesByDate,
    pub full_dates: BTreeSet<String>,
    pub slot_occupants: SlotOccupants,
    pub total_slots: usize,
}

impl AvailabilityView {
    /// Booked times and occupants come out of the same pass so they cannot
    /// disagree about which slots are taken.
    pub fn build(bookings: &[BookingRecord], grid: &TimeGrid) -> Self {
        let mut booked = BookedTimesByDate::new();
        let mut occupants = SlotOccupants::new();

        for (booking, moment) in active_moments(bookings) {
            booked
                .entry(moment.date.clone())
                .or_default()
                .insert(moment.time.clone());
            push_occupant(&mut occupants, moment, booking.display_name());
        }

        let full = full_dates(&booked, grid.len());
        Self {
            booked_times_by_date: booked,
            full_dates: full,
            slot_occupants: occupants,
            total_slots: grid.len(),
        }
    }

    pub fn is_reserved(&self, date: &str, time: &str) -> bool {
        self.booked_times_by_date
            .get(date)
            .is_some_and(|times| times.contains(time))
    }

    pub fn is_full(&self, date: &str) -> bool {
        self.full_dates.contains(date)
    }

    pub fn reserved_times(&self, date: &str) -> Vec<&str> {
        self.booked_times_by_date
            .get(date)
            .map(|times| times.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Grid slots of `date` that nobody holds, in grid order.
    pub fn available_times<'g>(&self, date: &str, grid: &'g TimeGrid) -> Vec<&'g str> {
        grid.slots()
            .iter()
            .map(String::as_str)
            .filter(|time| !self.is_reserved(date, time))
            .collect()
    }

    pub fn occupants(&self, date: &str, time: &str) -> &[String] {
        self.slot_occupants
            .get(date)
            .and_then(|slots| slots.get(time))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::BookingStatus;
    use serde_json::json;

    fn booking(id: i64, time: serde_json::Value, status: &str, name: &str) -> BookingRecord {
        serde_json::from_value(json!({
            "id": id,
            "bookingTime": time,
            "status": status,
            "user": {"fullName": name}
        }))
        .unwrap()
    }

    fn full_day(date: &str, count: usize) -> Vec<BookingRecord> {
        TimeGrid::standard()
            .slots()
            .iter()
            .take(count)
            .enumerate()
            .map(|(i, slot)| {
                booking(i as i64, json!(format!("{date}T{slot}:00")), "CONFIRMED", "Owner")
            })
            .collect()
    }

    #[test]
    fn test_booked_times_groups_and_dedupes() {
        let bookings = vec![
            booking(1, json!("2024-06-01T10:00:00"), "PENDING", "Alice"),
            booking(2, json!([2024, 6, 1, 10, 0, 0]), "CONFIRMED", "Bob"),
            booking(3, json!("2024-06-01T11:30:00"), "PENDING", "Carol"),
            booking(4, json!("2024-06-02T09:00:00"), "PENDING", "Dan"),
        ];
        let map = booked_times_by_date(&bookings);

        assert_eq!(map.len(), 2);
        assert_eq!(map["2024-06-01"].len(), 2);
        assert!(map["2024-06-01"].contains("10:00"));
        assert!(map["2024-06-01"].contains("11:30"));
        assert!(map["2024-06-02"].contains("09:00"));
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let bookings = vec![
            booking(1, json!("garbage"), "PENDING", "Alice"),
            booking(2, json!([2024]), "PENDING", "Bob"),
            booking(3, json!("2024-06-01T10:00:00"), "PENDING", "Carol"),
        ];
        let map = booked_times_by_date(&bookings);
        assert_eq!(map.len(), 1);
        assert_eq!(map["2024-06-01"].len(), 1);
    }

    #[test]
    fn test_full_date_at_exact_slot_count() {
        let bookings = full_day("2024-06-03", 22);
        let view = AvailabilityView::build(&bookings, TimeGrid::standard());
        assert!(view.is_full("2024-06-03"));
        assert!(view.available_times("2024-06-03", TimeGrid::standard()).is_empty());
    }

    #[test]
    fn test_one_free_slot_is_not_full() {
        let bookings = full_day("2024-06-03", 21);
        let view = AvailabilityView::build(&bookings, TimeGrid::standard());
        assert!(!view.is_full("2024-06-03"));
        assert_eq!(
            view.available_times("2024-06-03", TimeGrid::standard()),
            vec!["19:30"]
        );
    }

    #[test]
    fn test_duplicate_times_do_not_fill_a_day() {
        let bookings: Vec<_> = (0..30)
            .map(|i| booking(i, json!("2024-06-03T09:00:00"), "PENDING", "Same"))
            .collect();
        let view = AvailabilityView::build(&bookings, TimeGrid::standard());
        assert!(!view.is_full("2024-06-03"));
    }

    #[test]
    fn test_full_dates_subset_of_booked() {
        let mut bookings = full_day("2024-06-03", 22);
        bookings.extend(full_day("2024-06-04", 5));
        let booked = booked_times_by_date(&bookings);
        let full = full_dates(&booked, 22);

        for date in &full {
            assert!(booked.contains_key(date));
            assert!(booked[date].len() >= 22);
        }
        assert_eq!(full.len(), 1);
    }

    #[test]
    fn test_occupants_keep_order_and_drop_cancelled() {
        let bookings = vec![
            booking(1, json!("2024-06-01T10:00:00"), "PENDING", "Alice"),
            booking(2, json!("2024-06-01T10:00:00"), "CONFIRMED", "Bob"),
            booking(3, json!("2024-06-01T10:00:00"), "CANCELLED", "Carol"),
            booking(4, json!("2024-06-01T10:00:00"), "PENDING", "Alice"),
        ];
        let occupants = slot_occupants(&bookings);
        assert_eq!(occupants["2024-06-01"]["10:00"], vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_cancelled_never_appears() {
        let mut bookings = full_day("2024-06-05", 22);
        for b in &mut bookings {
            b.status = BookingStatus::Cancelled;
        }
        let view = AvailabilityView::build(&bookings, TimeGrid::standard());
        assert!(view.booked_times_by_date.is_empty());
        assert!(view.full_dates.is_empty());
        assert!(view.slot_occupants.is_empty());
    }

    #[test]
    fn test_view_matches_standalone_functions() {
        let bookings = vec![
            booking(1, json!("2024-06-01T10:00:00"), "PENDING", "Alice"),
            booking(2, json!([2024, 6, 1, 12, 30]), "COMPLETED", "Bob"),
            booking(3, json!("bad"), "PENDING", "Carol"),
        ];
        let view = AvailabilityView::build(&bookings, TimeGrid::standard());
        assert_eq!(view.booked_times_by_date, booked_times_by_date(&bookings));
        assert_eq!(view.slot_occupants, slot_occupants(&bookings));

        for (date, slots) in &view.slot_occupants {
            let times: BTreeSet<String> = slots.keys().cloned().collect();
            assert_eq!(&times, &view.booked_times_by_date[date]);
        }
    }

    #[test]
    fn test_occupants_lookup_defaults_to_empty() {
        let view = AvailabilityView::default();
        assert!(view.occupants("2024-06-01", "10:00").is_empty());
        assert!(view.reserved_times("2024-06-01").is_empty());
    }
}
