use sea_orm::{DatabaseConnection, DbErr, EntityTrait, QueryOrder};

use crate::entities::{permission, prelude::*, role};

#[derive(Clone)]
pub struct RoleService {
    db: DatabaseConnection,
}

impl RoleService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All roles ordered by name, each with its granted permissions.
    pub async fn list_roles_with_permissions(
        &self,
    ) -> Result<Vec<(role::Model, Vec<permission::Model>)>, DbErr> {
        Role::find()
            .order_by_asc(role::Column::Name)
            .find_with_related(Permission)
            .all(&self.db)
            .await
    }
}
