use serde::Serialize;
use uuid::Uuid;

use crate::entities::{activity, permission, role, user};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSummary {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
}

impl From<role::Model> for RoleSummary {
    fn from(role: role::Model) -> Self {
        Self {
            id: role.id,
            name: role.name,
            display_name: role.display_name,
        }
    }
}

/// A user as the dashboard sees it; never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub is_active: bool,
    pub email_verified: bool,
    pub last_login_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub roles: Vec<RoleSummary>,
}

impl UserDto {
    pub fn new(user: user::Model, roles: Vec<role::Model>) -> Self {
        Self {
            id: user.id,
            full_name: format!("{} {}", user.first_name, user.last_name),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            avatar: user.avatar,
            is_active: user.is_active,
            email_verified: user.email_verified,
            last_login_at: user.last_login_at.map(|at| at.to_rfc3339()),
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
            roles: roles.into_iter().map(RoleSummary::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    pub users: Vec<UserDto>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    #[serde(flatten)]
    pub user: UserDto,
    pub permissions: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDto {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub permissions: Vec<String>,
}

impl RoleDto {
    pub fn new(role: role::Model, permissions: Vec<permission::Model>) -> Self {
        let mut permissions: Vec<String> = permissions.into_iter().map(|p| p.name).collect();
        permissions.sort();
        Self {
            id: role.id,
            name: role.name,
            display_name: role.display_name,
            description: role.description,
            is_active: role.is_active,
            permissions,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityActor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDto {
    pub id: Uuid,
    pub action: String,
    pub description: Option<String>,
    pub user: Option<ActivityActor>,
    pub created_at: String,
}

impl ActivityDto {
    pub fn new(entry: activity::Model, actor: Option<user::Model>) -> Self {
        Self {
            id: entry.id,
            action: entry.action,
            description: entry.description,
            user: actor.map(|user| ActivityActor {
                id: user.id,
                name: format!("{} {}", user.first_name, user.last_name),
                email: user.email,
            }),
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

/// Recent activity is returned as a bare array under `activities`, not in `data`.
#[derive(Debug, Serialize)]
pub struct RecentActivityResponse {
    pub success: bool,
    pub activities: Vec<ActivityDto>,
}
