use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use tracing::warn;

use crate::entities::{prelude::*, setting};
use crate::seed::data::{DEFAULT_MAX_UPLOAD_SIZE, SETTING_MAX_UPLOAD_SIZE};

#[derive(Clone)]
pub struct SettingService {
    db: DatabaseConnection,
}

impl SettingService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, DbErr> {
        let setting = Setting::find()
            .filter(setting::Column::Key.eq(key))
            .one(&self.db)
            .await?;
        Ok(setting.map(|s| s.value))
    }

    /// Upload limit in bytes; falls back to the built-in default when the setting is
    /// missing or unparsable.
    pub async fn max_upload_size(&self) -> Result<u64, DbErr> {
        let Some(raw) = self.get(SETTING_MAX_UPLOAD_SIZE).await? else {
            return Ok(DEFAULT_MAX_UPLOAD_SIZE);
        };

        match raw.trim().parse::<u64>() {
            Ok(bytes) => Ok(bytes),
            Err(_) => {
                warn!(value = %raw, "{} is not a byte count, using default", SETTING_MAX_UPLOAD_SIZE);
                Ok(DEFAULT_MAX_UPLOAD_SIZE)
            }
        }
    }
}
