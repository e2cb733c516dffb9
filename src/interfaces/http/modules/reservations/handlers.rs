//! Reservation API handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    ByDayQuery, ByUserQuery, CreateReservationRequest, DayBookingsDto, ReservationBookingDto,
    ReservationDto,
};
use crate::application::{NewBooking, ReservationService};
use crate::interfaces::http::common::{ApiError, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::SessionUser;
use crate::shared::time::parse_day;

const INVALID_DATE: &str = "Invalid date format";
const OWN_DATA_ONLY: &str = "Access denied: You can only access your own data";

#[derive(Clone)]
pub struct ReservationState {
    pub reservations: Arc<ReservationService>,
}

fn query_error(rejection: QueryRejection) -> ApiError {
    ApiError::bad_request(rejection.body_text())
}

#[utoipa::path(
    get,
    path = "/api/reservations/by-day",
    tag = "Reservations",
    params(ByDayQuery),
    responses(
        (status = 200, description = "Reservations ordered by start time", body = ApiResponse<Vec<ReservationBookingDto>>),
        (status = 400, description = "Invalid date format"),
        (status = 401, description = "Authentication required")
    )
)]
pub async fn reservations_by_day(
    State(state): State<ReservationState>,
    query: Result<Query<ByDayQuery>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Vec<ReservationBookingDto>>>> {
    let Query(query) = query.map_err(query_error)?;
    let date = parse_day(&query.date).ok_or_else(|| ApiError::bad_request(INVALID_DATE))?;

    let bookings = state
        .reservations
        .reservations_by_amenity_and_date(query.amenity_id, date)
        .await?;
    Ok(Json(ApiResponse::success(
        bookings.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/reservations/by-user",
    tag = "Reservations",
    params(ByUserQuery),
    responses(
        (status = 200, description = "Reservations grouped by day", body = ApiResponse<Vec<DayBookingsDto>>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Another user's data was requested")
    )
)]
pub async fn reservations_by_user(
    State(state): State<ReservationState>,
    Extension(session): Extension<SessionUser>,
    query: Result<Query<ByUserQuery>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Vec<DayBookingsDto>>>> {
    let Query(query) = query.map_err(query_error)?;
    if query.user_id != session.user_id {
        tracing::warn!(
            requested = %query.user_id,
            "Rejected access to another user's reservations"
        );
        return Err(ApiError::forbidden(OWN_DATA_ONLY));
    }

    let days = state
        .reservations
        .user_bookings_grouped_by_day(&query.user_id)
        .await?;
    Ok(Json(ApiResponse::success(
        days.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/reservations",
    tag = "Reservations",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation booked", body = ApiResponse<ReservationDto>),
        (status = 400, description = "Invalid date or slot"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Amenity not found"),
        (status = 409, description = "Slot overlaps an existing reservation")
    )
)]
pub async fn create_reservation(
    State(state): State<ReservationState>,
    Extension(session): Extension<SessionUser>,
    ValidatedJson(request): ValidatedJson<CreateReservationRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ReservationDto>>)> {
    let date = parse_day(&request.date).ok_or_else(|| ApiError::bad_request(INVALID_DATE))?;

    let reservation = state
        .reservations
        .book(
            &session.user_id,
            NewBooking {
                amenity_id: request.amenity_id,
                date,
                start_time: request.start_time,
                end_time: request.end_time,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(reservation.into())),
    ))
}
