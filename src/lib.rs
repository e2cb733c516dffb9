//! # Amenity Booking
//!
//! Reservation service for shared amenities: users register and log in
//! with a cookie session, browse amenities, book time slots and query
//! bookings per amenity/day or per user grouped by day. A small utility
//! endpoint parses semicolon-delimited CSV uploads.
//!
//! ## Architecture
//!
//! - **domain**: entities and repository traits
//! - **application**: services (identity, amenities, reservations, CSV, sessions)
//! - **infrastructure**: SeaORM persistence, in-memory repositories, crypto
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: runtime lifecycle shared by binaries

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};

// Re-export API router
pub use interfaces::http::{create_api_router, AppState};
