//! Session authentication middleware for Axum
//!
//! The session token travels in a cookie. Protected routes get the
//! logged-in user as an `Extension<SessionUser>`.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration;

use super::common::ApiError;
use crate::application::{SessionData, SharedSessionStore};

pub const AUTH_REQUIRED: &str = "Authentication required";

/// The user behind the current session
pub type SessionUser = SessionData;

/// How the session cookie is written
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub secure: bool,
    pub max_age_secs: i64,
}

impl CookieSettings {
    /// Cookie that stores `token` for the session lifetime
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((self.name.clone(), token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(Duration::seconds(self.max_age_secs))
            .build()
    }

    /// Cookie matching the session cookie's path, for removal
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.name.clone(), ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build()
    }
}

/// State for the session middleware and the auth handlers
#[derive(Clone)]
pub struct SessionState {
    pub store: SharedSessionStore,
    pub cookie: CookieSettings,
}

impl SessionState {
    /// Session for the cookie in `jar`, if any
    pub fn current(&self, jar: &CookieJar) -> Option<(String, SessionUser)> {
        let token = session_token(jar, &self.cookie.name)?;
        let user = self.store.get(&token)?;
        Some((token, user))
    }
}

/// Value of the cookie called `name`, ignoring empty values
pub fn session_token(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Reject requests without a live session
pub async fn require_session(
    State(state): State<SessionState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let Some((_, user)) = state.current(&jar) else {
        return ApiError::unauthorized(AUTH_REQUIRED).into_response();
    };

    tracing::Span::current().record("user_id", user.user_id.as_str());
    request.extensions_mut().insert(user);
    next.run(request).await
}
