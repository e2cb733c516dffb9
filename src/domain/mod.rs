//! Domain layer: entities and repository interfaces
//!
//! Aggregates:
//! - `user`: registered accounts
//! - `amenity`: bookable facilities
//! - `reservation`: time slots booked on an amenity for a day

pub mod amenity;
pub mod repositories;
pub mod reservation;
pub mod user;

pub use amenity::{Amenity, AmenityRepository};
pub use repositories::RepositoryProvider;
pub use reservation::{Reservation, ReservationRepository};
pub use user::{CreateUserDto, User, UserRepositoryInterface};

pub use crate::shared::errors::{DomainError, DomainResult};
