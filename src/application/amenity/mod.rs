pub mod service;

pub use service::AmenityService;
