//! REST gateways mounted under `/api`.

pub mod auth;
pub mod dashboard;
pub mod profile;
pub mod response;
pub mod roles;
pub mod types;
pub mod users;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::auth_middleware;
use crate::error::{ApiError, ApiResult};

pub use response::ApiResponse;

pub fn router(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/roles", get(roles::list_roles))
        .route(
            "/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route("/profile/password", put(profile::change_password))
        .route("/dashboard/stats", get(dashboard::stats))
        .route("/dashboard/recent-activity", get(dashboard::recent_activity))
        .route_layer(middleware::from_fn_with_state(
            state.jwt_service.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/auth/login", post(auth::login))
        .merge(protected)
}

/// Unwraps a JSON body, turning extractor rejections into the error envelope.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Same as [`json_body`] for query strings.
pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

pub(crate) fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid id: {}", raw)))
}
