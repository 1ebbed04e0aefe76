use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::api::{
    json_body, parse_id, query_params,
    types::{UserDto, UserPage},
    ApiResponse,
};
use crate::app::AppState;
use crate::auth::{require_permission, AuthenticatedUser};
use crate::error::ApiResult;
use crate::services::{ActivityAction, NewUser, UserChanges};

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
    pub role_ids: Option<Vec<Uuid>>,
}

fn default_true() -> bool {
    true
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<UserPage>> {
    require_permission(&state.permission_service, &caller, "users.read").await?;
    let query = query_params(query)?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let (users, total) = state
        .user_service
        .list_users(query.search.as_deref(), page, limit)
        .await?;

    let mut items = Vec::with_capacity(users.len());
    for user in users {
        let roles = state.user_service.roles_for(&user).await?;
        items.push(UserDto::new(user, roles));
    }

    Ok(ApiResponse::ok(UserPage {
        users: items,
        total,
        page,
        limit,
    }))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<UserDto>> {
    require_permission(&state.permission_service, &caller, "users.read").await?;
    let id = parse_id(&id)?;

    let user = state.user_service.find_user_by_id(id).await?;
    let roles = state.user_service.roles_for(&user).await?;

    Ok(ApiResponse::ok(UserDto::new(user, roles)))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, ApiResponse<UserDto>)> {
    require_permission(&state.permission_service, &caller, "users.write").await?;
    let input = json_body(payload)?;

    let user = state
        .user_service
        .create_user(NewUser {
            email: input.email,
            password: input.password,
            first_name: input.first_name,
            last_name: input.last_name,
            phone: input.phone,
            is_active: input.is_active,
            role_ids: input.role_ids,
        })
        .await?;
    let roles = state.user_service.roles_for(&user).await?;

    info!(user_id = %user.id, created_by = %caller.id, "user created");
    state
        .activity_service
        .track(
            Some(caller.id),
            ActivityAction::UserCreated,
            format!("Created user {}", user.email),
        )
        .await;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("User created successfully", UserDto::new(user, roles)),
    ))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<UserDto>> {
    require_permission(&state.permission_service, &caller, "users.write").await?;
    let id = parse_id(&id)?;
    let input = json_body(payload)?;

    let user = state
        .user_service
        .update_user(
            id,
            UserChanges {
                email: input.email,
                first_name: input.first_name,
                last_name: input.last_name,
                phone: input.phone,
                is_active: input.is_active,
                password: input.password,
                role_ids: input.role_ids,
            },
        )
        .await?;
    let roles = state.user_service.roles_for(&user).await?;

    state
        .activity_service
        .track(
            Some(caller.id),
            ActivityAction::UserUpdated,
            format!("Updated user {}", user.email),
        )
        .await;

    Ok(ApiResponse::with_message(
        "User updated successfully",
        UserDto::new(user, roles),
    ))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    require_permission(&state.permission_service, &caller, "users.delete").await?;
    let id = parse_id(&id)?;

    let deleted = state.user_service.delete_user(id, caller.id).await?;

    info!(user_id = %deleted.id, deleted_by = %caller.id, "user deleted");
    state
        .activity_service
        .track(
            Some(caller.id),
            ActivityAction::UserDeleted,
            format!("Deleted user {}", deleted.email),
        )
        .await;

    Ok(ApiResponse::message("User deleted successfully"))
}
