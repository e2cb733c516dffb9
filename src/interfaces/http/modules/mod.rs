pub mod amenities;
pub mod auth;
pub mod csv_parser;
pub mod health;
pub mod metrics;
pub mod request_id;
pub mod reservations;
