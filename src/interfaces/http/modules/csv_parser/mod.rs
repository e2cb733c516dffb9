//! CSV upload parsing

pub mod handlers;

pub use handlers::*;
