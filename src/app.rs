//! Application state and router assembly.

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{error, warn};

use crate::auth::{JwtService, PermissionService};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::health::HealthMonitor;
use crate::services::{
    ActivityService, DashboardService, ProfileService, RoleService, SettingService, UserService,
};

/// Avatars travel inline as data URLs, so requests may exceed axum's 2 MB default.
const MAX_REQUEST_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub health: Arc<HealthMonitor>,
    pub jwt_service: JwtService,
    pub permission_service: PermissionService,
    pub user_service: UserService,
    pub profile_service: ProfileService,
    pub role_service: RoleService,
    pub dashboard_service: DashboardService,
    pub activity_service: ActivityService,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        let jwt_service = JwtService::new(&config.jwt_secret, config.jwt_expiration_hours);
        let settings = SettingService::new(db.clone());

        Self {
            permission_service: PermissionService::new(db.clone()),
            user_service: UserService::new(db.clone(), config.bcrypt_cost),
            profile_service: ProfileService::new(db.clone(), settings, config.bcrypt_cost),
            role_service: RoleService::new(db.clone()),
            dashboard_service: DashboardService::new(db.clone()),
            activity_service: ActivityService::new(db.clone()),
            health: Arc::new(HealthMonitor::new()),
            config: Arc::new(config),
            jwt_service,
            db,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        .nest("/health", crate::health::router())
        .nest("/api", crate::api::router(&state))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        warn!("🚨 CORS set to accept ANY origin (*) - only use in development!");
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "success": false,
            "message": "Method not allowed",
        })),
    )
        .into_response()
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(%detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "message": "Internal server error",
        })),
    )
        .into_response()
}
