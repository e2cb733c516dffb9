use chrono::{DateTime, Utc};

/// A bookable facility (pool, court, meeting room...)
#[derive(Clone, Debug, PartialEq)]
pub struct Amenity {
    /// Public numeric id used by clients
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
