//! API router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::common::ApiResponse;
use super::middleware::{require_session, CookieSettings, SessionState};
use super::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::modules::request_id::request_id_middleware;
use super::modules::{amenities, auth, csv_parser, health, reservations};
use crate::application::{
    AmenityService, CsvParserService, ReservationService, SharedSessionStore, UserService,
};
use crate::config::AppConfig;
use crate::domain::RepositoryProvider;

/// Slack above the CSV cap for multipart boundaries and part headers
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Everything the HTTP layer needs, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub users: Arc<UserService>,
    pub amenities: Arc<AmenityService>,
    pub reservations: Arc<ReservationService>,
    pub csv_parser: CsvParserService,
    pub session: SessionState,
    pub max_csv_bytes: usize,
    pub prometheus: PrometheusHandle,
    pub started_at: Arc<Instant>,
}

impl AppState {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        db: DatabaseConnection,
        sessions: SharedSessionStore,
        config: &AppConfig,
        prometheus: PrometheusHandle,
    ) -> Self {
        Self {
            db,
            users: Arc::new(UserService::new(repos.clone())),
            amenities: Arc::new(AmenityService::new(repos.clone())),
            reservations: Arc::new(ReservationService::new(repos)),
            csv_parser: CsvParserService::new(),
            session: SessionState {
                cookie: CookieSettings {
                    name: config.session.cookie_name.clone(),
                    secure: config.session.secure,
                    max_age_secs: sessions.ttl().num_seconds(),
                },
                store: sessions,
            },
            max_csv_bytes: config.upload.max_csv_bytes,
            prometheus,
            started_at: Arc::new(Instant::now()),
        }
    }
}

/// Session cookie scheme for OpenAPI, named after the configured cookie
struct SessionCookieScheme<'a>(&'a str);

impl Modify for SessionCookieScheme<'_> {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(self.0))),
            );
        }
    }
}

/// OpenAPI document with the session cookie scheme filled in
pub fn api_doc(cookie_name: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    SessionCookieScheme(cookie_name).modify(&mut doc);
    doc
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::welcome,
        health::health_check,
        super::modules::metrics::handlers::prometheus_metrics,
        // Auth
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        // Amenities
        amenities::list_amenities,
        amenities::get_amenity,
        // Reservations
        reservations::reservations_by_day,
        reservations::reservations_by_user,
        reservations::create_reservation,
        // CSV
        csv_parser::parse_csv,
    ),
    components(
        schemas(
            ApiResponse<String>,
            health::WelcomeResponse,
            health::HealthResponse,
            health::ComponentHealth,
            auth::RegisterRequest,
            auth::RegisterUserRequest,
            auth::LoginRequest,
            auth::UserInfo,
            auth::AuthResponse,
            auth::LogoutResponse,
            amenities::AmenityDto,
            reservations::ReservationBookingDto,
            reservations::ReservationInfoDto,
            reservations::DayBookingsDto,
            reservations::CreateReservationRequest,
            reservations::ReservationDto,
        )
    ),
    tags(
        (name = "Health", description = "Welcome, health and metrics"),
        (name = "Authentication", description = "Register, login and logout with a session cookie"),
        (name = "Amenities", description = "Bookable facilities"),
        (name = "Reservations", description = "Query and book amenity time slots"),
        (name = "CSV Parser", description = "Parse semicolon-delimited CSV uploads"),
    ),
    info(
        title = "Amenity Booking API",
        version = "1.0.0",
        description = "Book time slots on shared amenities",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(state: AppState) -> Router {
    let require_login =
        middleware::from_fn_with_state(state.session.clone(), require_session);

    // Auth: `/me` needs a session, the rest are public
    let auth_routes = Router::new()
        .route("/me", get(auth::me))
        .route_layer(require_login.clone())
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .with_state(auth::AuthHandlerState {
            users: state.users.clone(),
            session: state.session.clone(),
        });

    let amenity_routes = Router::new()
        .route("/", get(amenities::list_amenities))
        .route("/{id}", get(amenities::get_amenity))
        .with_state(amenities::AmenityState {
            amenities: state.amenities.clone(),
        });

    // Reservations (protected)
    let reservation_routes = Router::new()
        .route("/", post(reservations::create_reservation))
        .route("/by-day", get(reservations::reservations_by_day))
        .route("/by-user", get(reservations::reservations_by_user))
        .route_layer(require_login)
        .with_state(reservations::ReservationState {
            reservations: state.reservations.clone(),
        });

    let csv_routes = Router::new()
        .route("/parse", post(csv_parser::parse_csv))
        .layer(DefaultBodyLimit::max(
            state.max_csv_bytes.saturating_add(MULTIPART_OVERHEAD),
        ))
        .with_state(csv_parser::CsvParserState {
            parser: state.csv_parser,
            max_bytes: state.max_csv_bytes,
        });

    let health_routes = Router::new()
        .route("/api", get(health::welcome))
        .route("/api/health", get(health::health_check))
        .with_state(health::HealthState {
            db: state.db.clone(),
            sessions: state.session.store.clone(),
            started_at: state.started_at.clone(),
        });

    let metrics_routes = Router::new()
        .route("/api/metrics", get(prometheus_metrics))
        .with_state(MetricsState {
            handle: state.prometheus.clone(),
        });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url(
        "/api-doc/openapi.json",
        api_doc(&state.session.cookie.name),
    );

    Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .nest("/api/auth", auth_routes)
        .nest("/api/amenities", amenity_routes)
        .nest("/api/reservations", reservation_routes)
        .nest("/api/csv-parser", csv_routes)
        // Middleware, innermost first
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(request_id_middleware))
}
