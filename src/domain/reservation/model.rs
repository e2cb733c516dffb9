//! Reservation domain entity

use chrono::{DateTime, NaiveDate, Utc};

use crate::shared::errors::DomainError;
use crate::shared::time::MINUTES_PER_DAY;

/// A time slot booked on an amenity for one calendar day
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub id: String,
    pub amenity_id: i32,
    pub user_id: String,
    /// Minutes from 00:00 (e.g. 300 = 05:00)
    pub start_time: i32,
    /// Minutes from 00:00, exclusive
    pub end_time: i32,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Build a new reservation after checking the slot bounds.
    pub fn new(
        amenity_id: i32,
        user_id: impl Into<String>,
        start_time: i32,
        end_time: i32,
        date: NaiveDate,
    ) -> Result<Self, DomainError> {
        validate_slot(start_time, end_time)?;
        let now = Utc::now();
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            amenity_id,
            user_id: user_id.into(),
            start_time,
            end_time,
            date,
            created_at: now,
            updated_at: now,
        })
    }

    /// Slot length in minutes
    pub fn duration(&self) -> i32 {
        self.end_time - self.start_time
    }

    /// Whether `[start, end)` intersects this reservation's slot
    pub fn overlaps(&self, start: i32, end: i32) -> bool {
        start < self.end_time && self.start_time < end
    }
}

/// `0 <= start < end <= 1440`
pub fn validate_slot(start_time: i32, end_time: i32) -> Result<(), DomainError> {
    if start_time < 0 || start_time >= MINUTES_PER_DAY {
        return Err(DomainError::Validation(format!(
            "startTime must be between 0 and {}",
            MINUTES_PER_DAY - 1
        )));
    }
    if end_time <= start_time || end_time > MINUTES_PER_DAY {
        return Err(DomainError::Validation(format!(
            "endTime must be after startTime and at most {}",
            MINUTES_PER_DAY
        )));
    }
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────
