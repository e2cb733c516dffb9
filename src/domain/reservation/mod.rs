//! Reservation aggregate
//!
//! Contains the Reservation entity and repository interface.

pub mod model;
pub mod repository;

pub use model::Reservation;
pub use repository::ReservationRepository;
