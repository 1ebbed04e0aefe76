// Shared helpers for the integration tests.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use dashboard_api::{build_router, seed, AppConfig, AppState};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = seed::data::ADMIN_EMAIL;
pub const ADMIN_PASSWORD: &str = seed::data::ADMIN_PASSWORD;

/// Creates an in-memory database with every migration applied
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Migrated database with the baseline seed applied
pub async fn setup_seeded_db() -> DatabaseConnection {
    let db = setup_test_db().await;
    seed::run(&db).await.expect("Failed to seed test database");
    db
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        jwt_secret: "test-secret".to_string(),
        jwt_expiration_hours: 1,
        // Keeps hashing fast for accounts created through the API
        bcrypt_cost: 4,
        cors_allowed_origins: vec!["http://localhost:5173".to_string()],
    }
}

pub fn test_app(db: DatabaseConnection) -> Router {
    build_router(AppState::new(db, test_config()))
}

/// Sends one request through the router and decodes the JSON body (`Null` when empty).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Response body is not JSON")
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, Method::GET, uri, token, None).await
}

/// Logs in and returns the bearer token
pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");

    body["data"]["token"]
        .as_str()
        .expect("token in login response")
        .to_string()
}
