//! Reservation queries, per-day aggregation, and booking

pub mod service;
pub mod views;

pub use service::{NewBooking, ReservationService};
pub use views::{DayBookings, ReservationBooking, ReservationInfo};
