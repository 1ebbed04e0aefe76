use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::api::{json_body, types::{AuthPayload, UserDto}, ApiResponse};
use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::services::ActivityAction;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<AuthPayload>> {
    let input = json_body(payload)?;
    if input.email.trim().is_empty() || input.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let user = state
        .user_service
        .authenticate_user(&input.email, &input.password)
        .await?;
    let roles = state.user_service.roles_for(&user).await?;
    let role_names = roles.iter().map(|role| role.name.clone()).collect();

    let token = state
        .jwt_service
        .generate_token(user.id, &user.email, role_names)
        .map_err(|err| ApiError::Internal(format!("failed to sign token: {}", err)))?;

    info!(user_id = %user.id, "user logged in");
    state
        .activity_service
        .track(Some(user.id), ActivityAction::UserLogin, format!("{} signed in", user.email))
        .await;

    Ok(ApiResponse::with_message(
        "Login successful",
        AuthPayload {
            token,
            token_type: "Bearer",
            expires_in: state.jwt_service.expiration_hours() * 3600,
            user: UserDto::new(user, roles),
        },
    ))
}
