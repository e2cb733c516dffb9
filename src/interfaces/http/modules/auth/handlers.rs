//! Authentication API handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use super::dto::{AuthResponse, LoginRequest, LogoutResponse, RegisterRequest, UserInfo};
use crate::application::{SessionData, UserService};
use crate::domain::{DomainError, User};
use crate::interfaces::http::common::{ApiError, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::{SessionState, SessionUser};

#[derive(Clone)]
pub struct AuthHandlerState {
    pub users: Arc<UserService>,
    pub session: SessionState,
}

/// Replace any session on this request with a fresh one for `user` and
/// put its cookie in the jar
fn start_session(state: &AuthHandlerState, jar: CookieJar, user: &User) -> CookieJar {
    if let Some((old_token, _)) = state.session.current(&jar) {
        state.session.store.destroy(&old_token);
    }
    let token = state.session.store.create(SessionData {
        user_id: user.id.clone(),
        username: user.username.clone(),
        email: user.email.clone(),
    });
    jar.add(state.session.cookie.session_cookie(token))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created and logged in", body = ApiResponse<AuthResponse>),
        (status = 409, description = "Username already exists"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn register(
    State(state): State<AuthHandlerState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<Response> {
    let user = state.users.register(request.user.into()).await?;
    let jar = start_session(&state, jar, &user);

    let body = ApiResponse::success(AuthResponse { user: user.into() });
    Ok((StatusCode::CREATED, jar, Json(body)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid username or password"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Response> {
    let user = state.users.login(&request.username, &request.password).await?;
    let jar = start_session(&state, jar, &user);

    let body = ApiResponse::success(AuthResponse { user: user.into() });
    Ok((jar, Json(body)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Authentication",
    responses((status = 200, description = "Session ended", body = ApiResponse<LogoutResponse>))
)]
pub async fn logout(State(state): State<AuthHandlerState>, jar: CookieJar) -> Response {
    if let Some((token, user)) = state.session.current(&jar) {
        state.session.store.destroy(&token);
        info!(user_id = %user.user_id, "User logged out");
    }

    let body = ApiResponse::success(LogoutResponse {
        message: "Logged out successfully".to_string(),
    });
    let jar = jar.remove(state.session.cookie.removal_cookie());
    (jar, Json(body)).into_response()
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Authentication",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserInfo>),
        (status = 401, description = "Authentication required")
    )
)]
pub async fn me(
    State(state): State<AuthHandlerState>,
    Extension(session): Extension<SessionUser>,
) -> ApiResult<Json<ApiResponse<UserInfo>>> {
    let user = state
        .users
        .find_by_id(&session.user_id)
        .await?
        .ok_or_else(|| ApiError::from(DomainError::not_found("User", "id", &session.user_id)))?;
    Ok(Json(ApiResponse::success(user.into())))
}
