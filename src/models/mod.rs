pub mod availability;
pub mod booking;
pub mod booking_time;
pub mod time_grid;
pub mod workflow;

pub use availability::{AvailabilityView, BookedTimesByDate, SlotOccupants};
pub use booking::{BookingRecord, BookingStatus, BookingUser, NewBooking, ServiceRef};
pub use booking_time::{normalize_date, parse_booking_time, NormalizedMoment, RawBookingTime};
pub use time_grid::TimeGrid;
pub use workflow::{BookingDraft, BookingStep};
