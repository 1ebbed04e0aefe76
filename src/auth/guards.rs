use crate::auth::{AuthenticatedUser, PermissionService};
use crate::error::{ApiError, ApiResult};

/// Fails with 403 unless the caller's roles grant `permission`.
pub async fn require_permission(
    permission_service: &PermissionService,
    user: &AuthenticatedUser,
    permission: &str,
) -> ApiResult<()> {
    let has_permission = permission_service
        .user_has_permission(user.id, permission)
        .await?;

    if !has_permission {
        return Err(ApiError::Forbidden(format!(
            "Insufficient permissions: {} required",
            permission
        )));
    }

    Ok(())
}
