//! Read models returned by reservation queries

/// One reservation of an amenity on a given day
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationBooking {
    pub reservation_id: String,
    pub user_id: String,
    /// `HH:MM`
    pub start_time: String,
    /// Minutes
    pub duration: i32,
    pub amenity_name: String,
}

/// One of a user's reservations inside a day group
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationInfo {
    pub reservation_id: String,
    /// `HH:MM`
    pub start_time: String,
    /// Minutes
    pub duration: i32,
    pub amenity_name: String,
}

/// A user's reservations for one calendar day
#[derive(Debug, Clone, PartialEq)]
pub struct DayBookings {
    /// `YYYY-MM-DD`
    pub date: String,
    pub reservations: Vec<ReservationInfo>,
}
