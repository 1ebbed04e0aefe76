mod common;

use axum::http::StatusCode;
use chrono::DateTime;
use dashboard_api::{build_router, AppState};
use sea_orm::DatabaseConnection;

use common::{get, setup_test_db, test_app, test_config};

/// A connection whose every query fails, standing in for an unreachable database.
fn unreachable_db_app() -> axum::Router {
    build_router(AppState::new(DatabaseConnection::default(), test_config()))
}

#[tokio::test]
async fn test_basic_health_reports_ok() {
    let app = test_app(setup_test_db().await);

    let (status, body) = get(&app, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["status"], "OK");
    assert_eq!(data["environment"], "test");
    assert_eq!(data["version"], env!("CARGO_PKG_VERSION"));
    assert!(data["uptime"].as_f64().unwrap() >= 0.0);
    assert!(data["memory"]["resident"].is_number());
    assert!(data["cpu"]["cores"].as_u64().unwrap() >= 1);

    let timestamp = data["timestamp"].as_str().unwrap();
    assert!(DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn test_basic_health_ignores_database_state() {
    let (status, body) = get(&unreachable_db_app(), "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "OK");
}

#[tokio::test]
async fn test_detailed_health_with_reachable_database() {
    let app = test_app(setup_test_db().await);

    let (status, body) = get(&app, "/health/detailed", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["status"], "OK");
    for check in ["server", "database", "redis", "storage"] {
        assert_eq!(data["checks"][check], "OK", "{check} should be OK");
    }
    assert_eq!(data["system"]["platform"], std::env::consts::OS);
    assert_eq!(data["system"]["arch"], std::env::consts::ARCH);
    assert!(data["system"]["memory"]["hostTotal"].is_number());
}

#[tokio::test]
async fn test_detailed_health_degrades_when_database_is_down() {
    let (status, body) = get(&unreachable_db_app(), "/health/detailed", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["status"], "DEGRADED");
    assert_eq!(body["data"]["checks"]["database"], "ERROR");
    assert_eq!(body["data"]["checks"]["server"], "OK");
}

#[tokio::test]
async fn test_readiness_probe() {
    let app = test_app(setup_test_db().await);

    let (status, body) = get(&app, "/health/ready", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Service is ready");
    assert!(body.get("uptime").is_none());
}

#[tokio::test]
async fn test_liveness_does_not_touch_the_database() {
    let (status, body) = get(&unreachable_db_app(), "/health/live", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Service is alive");
    assert!(body["uptime"].as_f64().is_some());
    assert!(DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let app = test_app(setup_test_db().await);

    let (status, body) = get(&app, "/nope", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}
