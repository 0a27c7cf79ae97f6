#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use fitback_api::config::ServerConfig;
use fitback_api::router::build_app_router;
use fitback_api::state::AppState;
use fitback_core::session::SESSION_COOKIE_NAME;
use fitback_db::repositories::UserRepo;
use fitback_events::{EventBus, RecordingMailer};
use fitback_vision::FrameAnalyzer;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "correct-horse-42";
pub const ADMIN_EMAIL: &str = "admin@fitback.test";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout. `ADMIN_EMAIL` is on the allow-list.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        app_url: "http://localhost:5173".to_string(),
        secure_cookies: false,
        admin_emails: vec![ADMIN_EMAIL.to_string()],
        session_cleanup_interval_secs: 0,
    }
}

/// A router plus the doubles wired into it.
pub struct TestApp {
    pub router: Router,
    pub mailer: Arc<RecordingMailer>,
    pub event_bus: Arc<EventBus>,
    pub pool: PgPool,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router, using the given database pool, a
/// recording mailer and no vision model.
pub fn build_test_app(pool: PgPool) -> TestApp {
    build_test_app_with(pool, None)
}

/// Same as [`build_test_app`] with a frame analyzer installed.
pub fn build_test_app_with(pool: PgPool, analyzer: Option<Arc<dyn FrameAnalyzer>>) -> TestApp {
    let config = test_config();
    let mailer = Arc::new(RecordingMailer::default());
    let event_bus = Arc::new(EventBus::default());

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        mailer: mailer.clone(),
        frame_analyzer: analyzer,
        event_bus: event_bus.clone(),
    };

    TestApp {
        router: build_app_router(state, &config),
        mailer,
        event_bus,
        pool,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("router is infallible")
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(COOKIE, format!("{SESSION_COOKIE_NAME}={token}"));
    }
    match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, None, None)).await
}

/// GET with the session token in the cookie.
pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, Some(token), None)).await
}

/// GET with the session token in the `x-session-id` header.
pub async fn get_with_header(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("x-session-id", token)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, request(Method::POST, uri, None, Some(body))).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, request(Method::POST, uri, Some(token), Some(body))).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::POST, uri, Some(token), None)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, request(Method::PATCH, uri, Some(token), Some(body))).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, request(Method::PUT, uri, Some(token), Some(body))).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Raw `Set-Cookie` header of a response, if any.
pub fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Account helpers
// ---------------------------------------------------------------------------

/// Pull the token out of the latest email to `to` linking to `path`.
pub fn emailed_token(mailer: &RecordingMailer, to: &str, path: &str) -> Option<String> {
    let message = mailer
        .sent()
        .into_iter()
        .rev()
        .find(|m| m.to == to && m.text_body.contains(path))?;
    let start = message.text_body.find("token=")? + "token=".len();
    Some(
        message.text_body[start..]
            .chars()
            .take_while(char::is_ascii_alphanumeric)
            .collect(),
    )
}

/// Sign up through the API without verifying.
pub async fn sign_up(test: &TestApp, email: &str, name: &str) {
    let response = post_json(
        test.app(),
        "/api/v1/auth/signup",
        serde_json::json!({ "email": email, "password": TEST_PASSWORD, "name": name }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

/// Sign up, verify by the emailed link and sign in. Returns the session token.
pub async fn register_and_sign_in(test: &TestApp, email: &str, name: &str) -> String {
    sign_up(test, email, name).await;
    let token = emailed_token(&test.mailer, email, "/auth/verify-email").expect("verification email");
    let response = post_json(
        test.app(),
        "/api/v1/auth/verify-email",
        serde_json::json!({ "token": token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    sign_in(test, email).await
}

/// Sign in with [`TEST_PASSWORD`]. Returns the session token.
pub async fn sign_in(test: &TestApp, email: &str) -> String {
    let response = post_json(
        test.app(),
        "/api/v1/auth/signin",
        serde_json::json!({ "email": email, "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["session_id"].as_str().expect("session id").to_string()
}

/// Register the allow-listed administrator. Returns the session token.
pub async fn admin_session(test: &TestApp) -> String {
    register_and_sign_in(test, ADMIN_EMAIL, "Admin").await
}

/// Submit a valid feedback. Returns its id.
pub async fn submit_feedback(test: &TestApp, token: &str) -> i64 {
    let response = post_json_auth(
        test.app(),
        "/api/v1/feedback",
        token,
        serde_json::json!({
            "productUrl": "https://x.com/p1",
            "brand": "Nike",
            "size": "M",
            "fitScore": 3,
            "keptStatus": "kept",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["feedbackId"].as_i64().expect("feedback id")
}

/// Attach a video to a feedback.
pub async fn attach_video(test: &TestApp, token: &str, feedback_id: i64) -> Response<Body> {
    post_json_auth(
        test.app(),
        &format!("/api/v1/feedback/{feedback_id}/video"),
        token,
        serde_json::json!({ "storagePath": format!("videos/{feedback_id}.mp4"), "format": "mp4" }),
    )
    .await
}

pub async fn user_id(pool: &PgPool, email: &str) -> i64 {
    UserRepo::find_by_email(pool, email)
        .await
        .unwrap()
        .expect("user exists")
        .id
}
