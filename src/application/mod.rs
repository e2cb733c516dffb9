pub mod amenity;
pub mod csv_parser;
pub mod identity;
pub mod reservation;
pub mod session;

// Re-export key types for convenience
pub use amenity::AmenityService;
pub use csv_parser::{CsvParseError, CsvParserService, ParsedRow};
pub use identity::{RegisterUser, UserService};
pub use reservation::{
    DayBookings, NewBooking, ReservationBooking, ReservationInfo, ReservationService,
};
pub use session::{start_session_sweeper, SessionData, SessionStore, SharedSessionStore};
