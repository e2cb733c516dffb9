//! Reservation DTOs
//!
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::{DayBookings, ReservationBooking, ReservationInfo};
use crate::domain::Reservation;
use crate::shared::time::{format_date, format_minutes};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ByDayQuery {
    /// Amenity id
    pub amenity_id: i32,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp
    pub date: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ByUserQuery {
    /// Must be the id of the logged-in user
    pub user_id: String,
}

/// One reservation of an amenity on a day
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationBookingDto {
    pub reservation_id: String,
    pub user_id: String,
    /// `HH:MM`
    pub start_time: String,
    /// Minutes
    pub duration: i32,
    pub amenity_name: String,
}

impl From<ReservationBooking> for ReservationBookingDto {
    fn from(b: ReservationBooking) -> Self {
        Self {
            reservation_id: b.reservation_id,
            user_id: b.user_id,
            start_time: b.start_time,
            duration: b.duration,
            amenity_name: b.amenity_name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationInfoDto {
    pub reservation_id: String,
    pub start_time: String,
    pub duration: i32,
    pub amenity_name: String,
}

impl From<ReservationInfo> for ReservationInfoDto {
    fn from(i: ReservationInfo) -> Self {
        Self {
            reservation_id: i.reservation_id,
            start_time: i.start_time,
            duration: i.duration,
            amenity_name: i.amenity_name,
        }
    }
}

/// A user's reservations on one day
#[derive(Debug, Serialize, ToSchema)]
pub struct DayBookingsDto {
    /// `YYYY-MM-DD`
    pub date: String,
    pub reservations: Vec<ReservationInfoDto>,
}

impl From<DayBookings> for DayBookingsDto {
    fn from(d: DayBookings) -> Self {
        Self {
            date: d.date,
            reservations: d.reservations.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub amenity_id: i32,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp
    #[validate(length(min = 1, message = "date is required"))]
    pub date: String,
    /// Minutes from 00:00
    #[validate(range(min = 0, max = 1439, message = "startTime must be within 0..1439"))]
    pub start_time: i32,
    /// Minutes from 00:00, exclusive
    #[validate(range(min = 1, max = 1440, message = "endTime must be within 1..1440"))]
    pub end_time: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDto {
    pub reservation_id: String,
    pub amenity_id: i32,
    pub user_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub duration: i32,
}

impl From<Reservation> for ReservationDto {
    fn from(r: Reservation) -> Self {
        Self {
            duration: r.duration(),
            date: format_date(r.date),
            start_time: format_minutes(r.start_time),
            end_time: format_minutes(r.end_time),
            reservation_id: r.id,
            amenity_id: r.amenity_id,
            user_id: r.user_id,
        }
    }
}
