//! Database entities module

pub mod amenity;
pub mod reservation;
pub mod user;

pub use amenity::Entity as Amenity;
pub use reservation::Entity as Reservation;
pub use user::Entity as User;
