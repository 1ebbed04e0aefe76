use bcrypt::{hash, verify};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use crate::entities::{prelude::*, user};
use crate::error::{ServiceError, ServiceResult};
use crate::services::settings::SettingService;
use crate::services::user::{optional_text, required_name, validate_password};

#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    /// `Some("")` removes the current avatar.
    pub avatar: Option<String>,
}

#[derive(Clone)]
pub struct ProfileService {
    db: DatabaseConnection,
    settings: SettingService,
    bcrypt_cost: u32,
}

impl ProfileService {
    pub fn new(db: DatabaseConnection, settings: SettingService, bcrypt_cost: u32) -> Self {
        Self {
            db,
            settings,
            bcrypt_cost,
        }
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> ServiceResult<user::Model> {
        let user = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;
        let mut user_active: user::ActiveModel = user.into();

        if let Some(first_name) = changes.first_name {
            user_active.first_name = Set(required_name(&first_name, "First name")?);
        }
        if let Some(last_name) = changes.last_name {
            user_active.last_name = Set(required_name(&last_name, "Last name")?);
        }
        if let Some(phone) = changes.phone {
            user_active.phone = Set(optional_text(Some(phone)));
        }
        if let Some(avatar) = optional_avatar(changes.avatar) {
            match avatar {
                Some(avatar) => {
                    let max_bytes = self.settings.max_upload_size().await?;
                    validate_avatar(&avatar, max_bytes)?;
                    user_active.avatar = Set(Some(avatar));
                }
                None => user_active.avatar = Set(None),
            }
        }

        user_active.updated_at = Set(Utc::now().into());
        Ok(user_active.update(&self.db).await?)
    }

    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> ServiceResult<()> {
        let user = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;

        if !verify(current_password, &user.password_hash)? {
            return Err(ServiceError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }
        validate_password(new_password)?;
        if current_password == new_password {
            return Err(ServiceError::Validation(
                "New password must differ from the current one".to_string(),
            ));
        }

        let mut user_active: user::ActiveModel = user.into();
        user_active.password_hash = Set(hash(new_password, self.bcrypt_cost)?);
        user_active.updated_at = Set(Utc::now().into());
        user_active.update(&self.db).await?;

        Ok(())
    }
}

/// Outer `None`: leave unchanged. Inner `None`: clear.
fn optional_avatar(avatar: Option<String>) -> Option<Option<String>> {
    avatar.map(|value| optional_text(Some(value)))
}

/// Accepts `http(s)` URLs and `data:image/*` URLs whose decoded payload fits in
/// `max_bytes`.
pub fn validate_avatar(avatar: &str, max_bytes: u64) -> ServiceResult<()> {
    if avatar.starts_with("https://") || avatar.starts_with("http://") {
        return Ok(());
    }

    let Some(rest) = avatar.strip_prefix("data:image/") else {
        return Err(ServiceError::Validation(
            "Avatar must be an image URL or an image data URL".to_string(),
        ));
    };
    let Some((_, payload)) = rest.split_once(',') else {
        return Err(ServiceError::Validation("Malformed image data URL".to_string()));
    };

    // base64 carries 3 bytes per 4 characters
    let decoded_bytes = payload.trim_end_matches('=').len() as u64 * 3 / 4;
    if decoded_bytes > max_bytes {
        return Err(ServiceError::Validation(format!(
            "Avatar exceeds the maximum upload size of {} bytes",
            max_bytes
        )));
    }

    Ok(())
}
