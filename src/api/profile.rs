use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::api::{
    json_body,
    types::{ProfileDto, UserDto},
    ApiResponse,
};
use crate::app::AppState;
use crate::auth::AuthenticatedUser;
use crate::error::ApiResult;
use crate::services::{ActivityAction, ProfileChanges};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> ApiResult<ApiResponse<ProfileDto>> {
    let user = state.user_service.find_user_by_id(caller.id).await?;
    let roles = state.user_service.roles_for(&user).await?;
    let permissions = state
        .permission_service
        .get_user_permissions(caller.id)
        .await?;

    Ok(ApiResponse::ok(ProfileDto {
        user: UserDto::new(user, roles),
        permissions,
    }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<UserDto>> {
    let input = json_body(payload)?;

    let user = state
        .profile_service
        .update_profile(
            caller.id,
            ProfileChanges {
                first_name: input.first_name,
                last_name: input.last_name,
                phone: input.phone,
                avatar: input.avatar,
            },
        )
        .await?;
    let roles = state.user_service.roles_for(&user).await?;

    state
        .activity_service
        .track(Some(caller.id), ActivityAction::ProfileUpdated, "Updated profile")
        .await;

    Ok(ApiResponse::with_message(
        "Profile updated successfully",
        UserDto::new(user, roles),
    ))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<()>> {
    let input = json_body(payload)?;

    state
        .profile_service
        .change_password(caller.id, &input.current_password, &input.new_password)
        .await?;

    state
        .activity_service
        .track(Some(caller.id), ActivityAction::PasswordChanged, "Changed password")
        .await;

    Ok(ApiResponse::message("Password updated successfully"))
}
