use axum::{extract::State, Extension};

use crate::api::{types::RoleDto, ApiResponse};
use crate::app::AppState;
use crate::auth::{require_permission, AuthenticatedUser};
use crate::error::ApiResult;

pub async fn list_roles(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> ApiResult<ApiResponse<Vec<RoleDto>>> {
    require_permission(&state.permission_service, &caller, "roles.read").await?;

    let roles = state
        .role_service
        .list_roles_with_permissions()
        .await?
        .into_iter()
        .map(|(role, permissions)| RoleDto::new(role, permissions))
        .collect();

    Ok(ApiResponse::ok(roles))
}
