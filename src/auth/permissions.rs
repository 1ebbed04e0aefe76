use std::collections::BTreeSet;

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::{prelude::*, role_permission, user_role};

#[derive(Clone)]
pub struct PermissionService {
    db: DatabaseConnection,
}

impl PermissionService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Names of the active roles assigned to a user, sorted.
    pub async fn get_user_role_names(&self, user_id: Uuid) -> Result<Vec<String>, DbErr> {
        let roles = UserRole::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .find_also_related(Role)
            .all(&self.db)
            .await?;

        let names: BTreeSet<String> = roles
            .into_iter()
            .filter_map(|(_, role)| role)
            .filter(|role| role.is_active)
            .map(|role| role.name)
            .collect();

        Ok(names.into_iter().collect())
    }

    /// Every permission granted to the user through its active roles.
    ///
    /// Disabled or missing accounts hold no permissions.
    pub async fn get_user_permissions(&self, user_id: Uuid) -> Result<Vec<String>, DbErr> {
        let active = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .is_some_and(|user| user.is_active);
        if !active {
            return Ok(Vec::new());
        }

        let role_ids: Vec<Uuid> = UserRole::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .find_also_related(Role)
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(|(_, role)| role)
            .filter(|role| role.is_active)
            .map(|role| role.id)
            .collect();

        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let grants = RolePermission::find()
            .filter(role_permission::Column::RoleId.is_in(role_ids))
            .find_also_related(Permission)
            .all(&self.db)
            .await?;

        let names: BTreeSet<String> = grants
            .into_iter()
            .filter_map(|(_, permission)| permission)
            .map(|permission| permission.name)
            .collect();

        Ok(names.into_iter().collect())
    }

    pub async fn user_has_permission(&self, user_id: Uuid, permission: &str) -> Result<bool, DbErr> {
        let permissions = self.get_user_permissions(user_id).await?;
        Ok(permissions.iter().any(|name| name == permission))
    }
}
