//! CSV upload handler

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::application::CsvParserService;
use crate::interfaces::http::common::{ApiError, ApiResponse, ApiResult};

/// Multipart field carrying the upload
pub const FILE_FIELD: &str = "file";

#[derive(Clone)]
pub struct CsvParserState {
    pub parser: CsvParserService,
    pub max_bytes: usize,
}

fn multipart_error(e: MultipartError) -> ApiError {
    ApiError::new(e.status(), e.body_text())
}

fn too_large(max_bytes: usize) -> ApiError {
    ApiError::new(
        StatusCode::PAYLOAD_TOO_LARGE,
        format!("File exceeds the {} byte limit", max_bytes),
    )
}

#[utoipa::path(
    post,
    path = "/api/csv-parser/parse",
    tag = "CSV Parser",
    request_body(content_type = "multipart/form-data", description = "Semicolon-delimited CSV in the `file` field"),
    responses(
        (status = 200, description = "One object per data row, keyed by header"),
        (status = 400, description = "No file, wrong extension or malformed CSV"),
        (status = 413, description = "File too large")
    )
)]
pub async fn parse_csv(
    State(state): State<CsvParserState>,
    mut multipart: Multipart,
) -> ApiResult<Json<ApiResponse<Vec<Map<String, Value>>>>> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if !file_name.ends_with(".csv") {
            return Err(ApiError::bad_request("File must be a CSV file"));
        }

        let bytes = field.bytes().await.map_err(multipart_error)?;
        if bytes.len() > state.max_bytes {
            return Err(too_large(state.max_bytes));
        }

        let rows = state.parser.parse(&bytes).map_err(|e| {
            warn!(file = %file_name, error = %e, "CSV upload rejected");
            ApiError::bad_request(e.to_string())
        })?;
        info!(file = %file_name, rows = rows.len(), "CSV upload parsed");
        return Ok(Json(ApiResponse::success(rows)));
    }

    Err(ApiError::bad_request("No file uploaded"))
}
