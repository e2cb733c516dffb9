//! Amenity API handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};

use super::dto::AmenityDto;
use crate::application::AmenityService;
use crate::domain::DomainError;
use crate::interfaces::http::common::{ApiError, ApiResponse, ApiResult};

#[derive(Clone)]
pub struct AmenityState {
    pub amenities: Arc<AmenityService>,
}

#[utoipa::path(
    get,
    path = "/api/amenities",
    tag = "Amenities",
    responses((status = 200, description = "All amenities", body = ApiResponse<Vec<AmenityDto>>))
)]
pub async fn list_amenities(
    State(state): State<AmenityState>,
) -> ApiResult<Json<ApiResponse<Vec<AmenityDto>>>> {
    let amenities = state.amenities.list().await?;
    Ok(Json(ApiResponse::success(
        amenities.into_iter().map(AmenityDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/amenities/{id}",
    tag = "Amenities",
    params(("id" = i32, Path, description = "Amenity id")),
    responses(
        (status = 200, description = "Amenity", body = ApiResponse<AmenityDto>),
        (status = 400, description = "Amenity id is not a number"),
        (status = 404, description = "Amenity not found")
    )
)]
pub async fn get_amenity(
    State(state): State<AmenityState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<ApiResponse<AmenityDto>>> {
    let Path(id) = id.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let amenity = state
        .amenities
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Amenity", "id", id))?;
    Ok(Json(ApiResponse::success(amenity.into())))
}
