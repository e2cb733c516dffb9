//! End-to-end tests of the HTTP API against a migrated in-memory SQLite

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::{create_api_router, AppState};
use crate::application::SessionStore;
use crate::config::AppConfig;
use crate::domain::RepositoryProvider;
use crate::infrastructure::database::test_database;
use crate::infrastructure::SeaOrmRepositoryProvider;

struct TestApp {
    router: Router,
    repos: Arc<dyn RepositoryProvider>,
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

async fn app_with(config: AppConfig) -> TestApp {
    let db = test_database().await;
    let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
    repos.amenities().create("Swimming Pool").await.unwrap();
    repos.amenities().create("Tennis Court").await.unwrap();

    let sessions = SessionStore::shared(config.session.ttl());
    let prometheus = PrometheusBuilder::new().build_recorder().handle();
    let state = AppState::new(repos.clone(), db, sessions, &config, prometheus);
    TestApp {
        router: create_api_router(state),
        repos,
    }
}

async fn app() -> TestApp {
    app_with(AppConfig::default()).await
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> TestResponse {
        let resp = self.router.clone().oneshot(request).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse {
            status,
            headers,
            body,
        }
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        let mut req = Request::builder().method(Method::GET).uri(uri);
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    async fn post_json(&self, uri: &str, body: Value, cookie: Option<&str>) -> TestResponse {
        let mut req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        self.send(req.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Register `username` and return (cookie, user id)
    async fn register(&self, username: &str) -> (String, String) {
        let resp = self
            .post_json(
                "/api/auth/register",
                json!({"user": {
                    "username": username,
                    "password": "password123",
                    "first_name": "John",
                    "last_name": "Doe",
                    "email": format!("{}@example.com", username),
                }}),
                None,
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "{}", resp.body);
        let id = resp.body["data"]["user"]["_id"].as_str().unwrap().to_string();
        (session_cookie(&resp.headers), id)
    }
}

/// `name=value` part of the `Set-Cookie` header
fn session_cookie(headers: &HeaderMap) -> String {
    let set_cookie = headers[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

fn multipart(field: &str, file_name: &str, content: &[u8]) -> Request<Body> {
    let boundary = "X-BOOKING-BOUNDARY";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"; filename=\"{n}\"\r\nContent-Type: text/csv\r\n\r\n",
            b = boundary,
            f = field,
            n = file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/csv-parser/parse")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

// ── Root & health ──────────────────────────────────────────────────

#[tokio::test]
async fn welcome_and_health() {
    let app = app().await;

    let resp = app.get("/api", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["success"], true);
    assert!(resp.headers.contains_key("x-request-id"));

    let resp = app.get("/api/health", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["status"], "ok");
    assert_eq!(resp.body["database"]["status"], "ok");
}

#[tokio::test]
async fn openapi_names_configured_cookie() {
    let mut config = AppConfig::default();
    config.session.cookie_name = "custom_sid".into();
    let app = app_with(config).await;

    let resp = app.get("/api-doc/openapi.json", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    let scheme = &resp.body["components"]["securitySchemes"]["session_cookie"];
    assert_eq!(scheme["in"], "cookie");
    assert_eq!(scheme["name"], "custom_sid");
}

// ── Auth ───────────────────────────────────────────────────────────

#[tokio::test]
async fn register_sets_session_cookie() {
    let app = app().await;
    let resp = app
        .post_json(
            "/api/auth/register",
            json!({"user": {
                "username": "john_doe",
                "password": "password123",
                "first_name": "John",
                "last_name": "Doe",
                "email": "john.doe@example.com",
            }}),
            None,
        )
        .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.body["success"], true);
    let user = &resp.body["data"]["user"];
    assert_eq!(user["username"], "john_doe");
    assert_eq!(user["first_name"], "John");
    assert!(user.get("password_hash").is_none());

    let set_cookie = resp.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("booking_sid="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Max-Age=86400"));
}

#[tokio::test]
async fn register_rejects_duplicate_and_invalid_input() {
    let app = app().await;
    app.register("john_doe").await;

    let dup = app
        .post_json(
            "/api/auth/register",
            json!({"user": {
                "username": "john_doe",
                "password": "password123",
                "first_name": "Other",
                "last_name": "Person",
                "email": "other@example.com",
            }}),
            None,
        )
        .await;
    assert_eq!(dup.status, StatusCode::CONFLICT);
    assert_eq!(dup.body["success"], false);
    assert_eq!(dup.body["error"], "Username already exists");

    let invalid = app
        .post_json(
            "/api/auth/register",
            json!({"user": {
                "username": "jo",
                "password": "123",
                "first_name": "",
                "last_name": "Doe",
                "email": "not-an-email",
            }}),
            None,
        )
        .await;
    assert_eq!(invalid.status, StatusCode::UNPROCESSABLE_ENTITY);
    let error = invalid.body["error"].as_str().unwrap();
    assert!(error.contains("user.username"));
    assert!(error.contains("user.password"));
    assert!(error.contains("user.email"));
}

#[tokio::test]
async fn login_me_and_logout() {
    let app = app().await;
    app.register("jane_smith").await;

    let bad = app
        .post_json(
            "/api/auth/login",
            json!({"username": "jane_smith", "password": "wrong-password"}),
            None,
        )
        .await;
    assert_eq!(bad.status, StatusCode::UNAUTHORIZED);
    assert_eq!(bad.body["error"], "Invalid username or password");

    let ok = app
        .post_json(
            "/api/auth/login",
            json!({"username": "jane_smith", "password": "password123"}),
            None,
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK);
    let cookie = session_cookie(&ok.headers);

    let me = app.get("/api/auth/me", Some(&cookie)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["username"], "jane_smith");

    let out = app.post_json("/api/auth/logout", json!({}), Some(&cookie)).await;
    assert_eq!(out.status, StatusCode::OK);
    assert_eq!(out.body["data"]["message"], "Logged out successfully");
    assert!(out.headers[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .contains("Max-Age=0"));

    let after = app.get("/api/auth/me", Some(&cookie)).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn custom_cookie_name_round_trips() {
    let mut config = AppConfig::default();
    config.session.cookie_name = "custom_sid".into();
    let app = app_with(config).await;

    let (cookie, _) = app.register("john_doe").await;
    assert!(cookie.starts_with("custom_sid="));

    let me = app
        .get("/api/auth/me", Some(&format!("theme=\"a=b\"; {}", cookie)))
        .await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["username"], "john_doe");
}

#[tokio::test]
async fn protected_routes_need_a_session() {
    let app = app().await;

    for uri in [
        "/api/auth/me",
        "/api/reservations/by-day?amenityId=1&date=2024-01-15",
        "/api/reservations/by-user?userId=abc",
    ] {
        let resp = app.get(uri, None).await;
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(resp.body["error"], "Authentication required");
    }

    let forged = app
        .get("/api/auth/me", Some("booking_sid=deadbeef"))
        .await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
}

// ── Amenities ──────────────────────────────────────────────────────

#[tokio::test]
async fn list_and_get_amenities() {
    let app = app().await;

    let list = app.get("/api/amenities", None).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body["data"][0]["name"], "Swimming Pool");
    assert_eq!(list.body["data"][1]["name"], "Tennis Court");

    let one = app.get("/api/amenities/2", None).await;
    assert_eq!(one.body["data"]["name"], "Tennis Court");

    let missing = app.get("/api/amenities/99", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["success"], false);
}

#[tokio::test]
async fn non_numeric_amenity_id_uses_envelope() {
    let app = app().await;

    let resp = app.get("/api/amenities/abc", None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["success"], false);
    assert!(resp.body["error"].as_str().is_some_and(|e| !e.is_empty()));
}

// ── Reservations ───────────────────────────────────────────────────

#[tokio::test]
async fn book_then_query_by_day() {
    let app = app().await;
    let (cookie, user_id) = app.register("john_doe").await;

    let booked = app
        .post_json(
            "/api/reservations",
            json!({"amenityId": 1, "date": "2024-01-15", "startTime": 540, "endTime": 600}),
            Some(&cookie),
        )
        .await;
    assert_eq!(booked.status, StatusCode::CREATED, "{}", booked.body);
    assert_eq!(booked.body["data"]["startTime"], "09:00");
    assert_eq!(booked.body["data"]["userId"], user_id.as_str());

    let day = app
        .get(
            "/api/reservations/by-day?amenityId=1&date=2024-01-15T10:00:00Z",
            Some(&cookie),
        )
        .await;
    assert_eq!(day.status, StatusCode::OK);
    assert_eq!(
        day.body["data"],
        json!([{
            "reservationId": booked.body["data"]["reservationId"],
            "userId": user_id,
            "startTime": "09:00",
            "duration": 60,
            "amenityName": "Swimming Pool",
        }])
    );

    let unknown = app
        .get("/api/reservations/by-day?amenityId=99&date=2024-01-15", Some(&cookie))
        .await;
    assert_eq!(unknown.status, StatusCode::OK);
    assert_eq!(unknown.body["data"], json!([]));
}

#[tokio::test]
async fn by_day_rejects_bad_input() {
    let app = app().await;
    let (cookie, _) = app.register("john_doe").await;

    let bad_date = app
        .get("/api/reservations/by-day?amenityId=1&date=yesterday", Some(&cookie))
        .await;
    assert_eq!(bad_date.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_date.body["error"], "Invalid date format");

    let bad_id = app
        .get("/api/reservations/by-day?amenityId=pool&date=2024-01-15", Some(&cookie))
        .await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_id.body["success"], false);
}

#[tokio::test]
async fn overlapping_booking_is_a_conflict() {
    let app = app().await;
    let (cookie, _) = app.register("john_doe").await;
    let slot = json!({"amenityId": 2, "date": "2024-01-15", "startTime": 600, "endTime": 660});

    assert_eq!(
        app.post_json("/api/reservations", slot.clone(), Some(&cookie)).await.status,
        StatusCode::CREATED
    );
    let again = app.post_json("/api/reservations", slot, Some(&cookie)).await;
    assert_eq!(again.status, StatusCode::CONFLICT);

    let missing_amenity = app
        .post_json(
            "/api/reservations",
            json!({"amenityId": 42, "date": "2024-01-15", "startTime": 600, "endTime": 660}),
            Some(&cookie),
        )
        .await;
    assert_eq!(missing_amenity.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn by_user_only_serves_own_data() {
    let app = app().await;
    let (cookie, user_id) = app.register("john_doe").await;
    let (_, other_id) = app.register("jane_smith").await;

    for (date, start) in [("2024-01-16", 720), ("2024-01-15", 480), ("2024-01-15", 600)] {
        let resp = app
            .post_json(
                "/api/reservations",
                json!({"amenityId": 1, "date": date, "startTime": start, "endTime": start + 60}),
                Some(&cookie),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED);
    }

    let forbidden = app
        .get(&format!("/api/reservations/by-user?userId={}", other_id), Some(&cookie))
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    assert_eq!(
        forbidden.body["error"],
        "Access denied: You can only access your own data"
    );

    let own = app
        .get(&format!("/api/reservations/by-user?userId={}", user_id), Some(&cookie))
        .await;
    assert_eq!(own.status, StatusCode::OK);
    let days = own.body["data"].as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["date"], "2024-01-15");
    assert_eq!(days[0]["reservations"][0]["startTime"], "08:00");
    assert_eq!(days[0]["reservations"][1]["startTime"], "10:00");
    assert_eq!(days[1]["date"], "2024-01-16");
    assert_eq!(days[1]["reservations"][0]["amenityName"], "Swimming Pool");

    assert_eq!(app.repos.reservations().count().await.unwrap(), 3);
}

// ── CSV ────────────────────────────────────────────────────────────

#[tokio::test]
async fn csv_upload_is_parsed() {
    let app = app().await;
    let resp = app
        .send(multipart("file", "people.csv", b"name;age\nJohn;30\nJane;25"))
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.body["data"],
        json!([{"name": "John", "age": "30"}, {"name": "Jane", "age": "25"}])
    );
}

#[tokio::test]
async fn csv_upload_errors() {
    let app = app().await;

    let no_file = app.send(multipart("other", "people.csv", b"a;b")).await;
    assert_eq!(no_file.status, StatusCode::BAD_REQUEST);
    assert_eq!(no_file.body["error"], "No file uploaded");

    let wrong_ext = app.send(multipart("file", "people.txt", b"a;b")).await;
    assert_eq!(wrong_ext.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_ext.body["error"], "File must be a CSV file");

    let malformed = app
        .send(multipart("file", "people.csv", b"name;note\nJohn;\"open"))
        .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(malformed.body["success"], false);
}

#[tokio::test]
async fn csv_upload_over_cap_is_413() {
    let mut config = AppConfig::default();
    config.upload.max_csv_bytes = 16;
    let app = app_with(config).await;

    let resp = app
        .send(multipart("file", "big.csv", b"name;age\nJohn;30\nJane;25\n"))
        .await;
    assert_eq!(resp.status, StatusCode::PAYLOAD_TOO_LARGE);
}
