//! Identity: registration, login, user lookup

pub mod service;

pub use service::{RegisterUser, UserService};
