use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, QuerySelect, Set,
};
use chrono::Utc;
use strum::{AsRefStr, Display, EnumString};
use tracing::warn;
use uuid::Uuid;

use crate::entities::{activity, prelude::*, user};

/// Action identifiers stored in `activity.action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString)]
pub enum ActivityAction {
    #[strum(serialize = "user.login")]
    UserLogin,
    #[strum(serialize = "user.created")]
    UserCreated,
    #[strum(serialize = "user.updated")]
    UserUpdated,
    #[strum(serialize = "user.deleted")]
    UserDeleted,
    #[strum(serialize = "profile.updated")]
    ProfileUpdated,
    #[strum(serialize = "profile.password_changed")]
    PasswordChanged,
}

#[derive(Clone)]
pub struct ActivityService {
    db: DatabaseConnection,
}

impl ActivityService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn record(
        &self,
        user_id: Option<Uuid>,
        action: ActivityAction,
        description: impl Into<String>,
    ) -> Result<activity::Model, DbErr> {
        let entry = activity::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            action: Set(action.as_ref().to_string()),
            description: Set(Some(description.into())),
            created_at: Set(Utc::now().into()),
        };

        entry.insert(&self.db).await
    }

    /// Like [`record`](Self::record), but a failed write only logs a warning.
    ///
    /// The audit trail must never fail the request it describes.
    pub async fn track(
        &self,
        user_id: Option<Uuid>,
        action: ActivityAction,
        description: impl Into<String>,
    ) {
        if let Err(err) = self.record(user_id, action, description).await {
            warn!(%action, "failed to record activity: {}", err);
        }
    }

    /// Newest entries first, each paired with its actor when the account still exists.
    pub async fn recent(
        &self,
        limit: u64,
    ) -> Result<Vec<(activity::Model, Option<user::Model>)>, DbErr> {
        Activity::find()
            .find_also_related(User)
            .order_by_desc(activity::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
    }
}
