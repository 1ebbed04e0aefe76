use chrono::{DateTime, Datelike, FixedOffset, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;

use crate::entities::{prelude::*, user};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub active_users: u64,
    pub inactive_users: u64,
    pub total_roles: u64,
    pub total_permissions: u64,
    pub new_users_this_month: u64,
}

#[derive(Clone)]
pub struct DashboardService {
    db: DatabaseConnection,
}

impl DashboardService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn stats(&self) -> Result<DashboardStats, DbErr> {
        let total_users = User::find().count(&self.db).await?;
        let active_users = User::find()
            .filter(user::Column::IsActive.eq(true))
            .count(&self.db)
            .await?;
        let total_roles = Role::find().count(&self.db).await?;
        let total_permissions = Permission::find().count(&self.db).await?;
        let new_users_this_month = User::find()
            .filter(user::Column::CreatedAt.gte(start_of_month(Utc::now())))
            .count(&self.db)
            .await?;

        Ok(DashboardStats {
            total_users,
            active_users,
            inactive_users: total_users.saturating_sub(active_users),
            total_roles,
            total_permissions,
            new_users_this_month,
        })
    }
}

fn start_of_month(now: DateTime<Utc>) -> DateTime<FixedOffset> {
    let first_day = now
        .date_naive()
        .with_day(1)
        .unwrap_or_else(|| now.date_naive());
    first_day.and_time(chrono::NaiveTime::MIN).and_utc().fixed_offset()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn start_of_month_truncates_to_midnight_on_the_first() {
        let now = Utc.with_ymd_and_hms(2025, 3, 17, 14, 5, 9).unwrap();
        let start = start_of_month(now);
        assert_eq!(start.to_rfc3339(), "2025-03-01T00:00:00+00:00");
    }
}
