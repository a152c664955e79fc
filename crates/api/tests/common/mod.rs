//! Shared helpers for HTTP-level integration tests.
//!
//! Helpers are compiled into every test binary; not all binaries use all
//! of them.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::util::ServiceExt;

use opsdesk_api::auth::jwt::JwtConfig;
use opsdesk_api::auth::password::hash_password;
use opsdesk_api::config::{OAuthProvider, ServerConfig};
use opsdesk_api::router::build_app_router;
use opsdesk_api::state::AppState;
use opsdesk_db::models::user::CreateUser;
use opsdesk_db::repositories::UserRepo;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a fixed JWT secret, and a fixed token encryption key. No OAuth
/// providers are configured; tests that need one add it themselves.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        public_base_url: "http://localhost:3000".to_string(),
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 60,
        },
        token_encryption_key: [7u8; 32],
        assets_dir: PathBuf::from("assets"),
        placements_path: PathBuf::from("assets/placements.json"),
        oauth_providers: HashMap::new(),
    }
}

/// An OAuth provider entry pointing at the given token endpoint. The
/// authorize endpoint is never contacted by tests, so a fixed URL is fine.
pub fn test_oauth_provider(token_url: &str) -> OAuthProvider {
    OAuthProvider {
        client_id: "test-client-id".to_string(),
        client_secret: "test-client-secret".to_string(),
        authorize_url: "https://provider.example.com/oauth/authorize".to_string(),
        token_url: token_url.to_string(),
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and the default test configuration.
pub async fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_config(pool, test_config()).await
}

/// Build the application router with a caller-supplied configuration.
///
/// This goes through [`build_app_router`] so integration tests exercise
/// the same middleware stack (CORS, request ID, timeout, tracing, panic
/// recovery) that production uses.
pub async fn build_test_app_with_config(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        http: reqwest::Client::new(),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Flexible request builder used by the convenience wrappers below.
pub async fn request(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    cookie: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    request(app, Method::GET, uri, None, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    request(app, Method::GET, uri, Some(token), None, None).await
}

pub async fn get_with_cookie(app: Router, uri: &str, cookie: &str) -> Response<Body> {
    request(app, Method::GET, uri, None, Some(cookie), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    request(app, Method::POST, uri, None, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    request(app, Method::POST, uri, Some(token), None, Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    request(app, Method::POST, uri, Some(token), None, None).await
}

pub async fn post_with_cookie(app: Router, uri: &str, cookie: &str) -> Response<Body> {
    request(app, Method::POST, uri, None, Some(cookie), None).await
}

pub async fn put_json_with_cookie(
    app: Router,
    uri: &str,
    cookie: &str,
    body: serde_json::Value,
) -> Response<Body> {
    request(app, Method::PUT, uri, None, Some(cookie), Some(body)).await
}

/// Deserialize a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        panic!(
            "response body was not valid JSON: {e}: {}",
            String::from_utf8_lossy(&bytes)
        )
    })
}

/// Collect every `Set-Cookie` header value from a response.
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(axum::http::header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// Extract a cookie's `name=value` pair from a response's `Set-Cookie`
/// headers, suitable for echoing back in a `Cookie` request header.
pub fn cookie_pair(response: &Response<Body>, name: &str) -> Option<String> {
    set_cookies(response).into_iter().find_map(|c| {
        let pair = c.split(';').next()?.trim().to_string();
        pair.starts_with(&format!("{name}=")).then_some(pair)
    })
}

// ---------------------------------------------------------------------------
// Fixture helpers
// ---------------------------------------------------------------------------

/// Create an operator account directly in the database and return the
/// user row plus the plaintext password used.
pub async fn create_test_user(
    pool: &PgPool,
    username: &str,
    role: &str,
) -> (opsdesk_db::models::user::User, String) {
    let password = "test_password_123!";
    let hashed = hash_password(password).expect("hashing should succeed");
    let input = CreateUser {
        username: username.to_string(),
        email: format!("{username}@test.com"),
        password_hash: hashed,
        role: role.to_string(),
    };
    let user = UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed");
    (user, password.to_string())
}

/// Create an operator and log in via the API, returning an access token.
pub async fn login_as(pool: &PgPool, app: Router, username: &str, role: &str) -> String {
    let (_user, password) = create_test_user(pool, username, role).await;
    let body = serde_json::json!({ "username": username, "password": password });
    let response = post_json(app, "/api/auth/login", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let json = body_json(response).await;
    json["access_token"]
        .as_str()
        .expect("login response must contain access_token")
        .to_string()
}
