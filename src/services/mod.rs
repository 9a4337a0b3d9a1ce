pub mod calendar;
pub mod gateway;
pub mod pending;
pub mod store_bookings;
pub mod workflow;
