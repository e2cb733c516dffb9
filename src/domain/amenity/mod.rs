//! Amenity aggregate

pub mod model;
pub mod repository;

pub use model::Amenity;
pub use repository::AmenityRepository;
