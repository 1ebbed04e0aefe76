use bcrypt::{hash, verify};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{prelude::*, role, user, user_role};
use crate::error::{ServiceError, ServiceResult};
use crate::seed::data::USER_ROLE;

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub is_active: bool,
    /// Empty means the default `user` role.
    pub role_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
    pub role_ids: Option<Vec<Uuid>>,
}

#[derive(Clone)]
pub struct UserService {
    db: DatabaseConnection,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(db: DatabaseConnection, bcrypt_cost: u32) -> Self {
        Self { db, bcrypt_cost }
    }

    /// Checks credentials and stamps `last_login_at` on success.
    pub async fn authenticate_user(&self, email: &str, password: &str) -> ServiceResult<user::Model> {
        let email = email.trim().to_lowercase();
        let user = User::find()
            .filter(user::Column::Email.eq(&email))
            .one(&self.db)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !verify(password, &user.password_hash)? {
            return Err(ServiceError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(ServiceError::AccountDisabled);
        }

        let mut user_active: user::ActiveModel = user.into();
        user_active.last_login_at = Set(Some(Utc::now().into()));
        Ok(user_active.update(&self.db).await?)
    }

    /// One page of users (1-based `page`), newest first, plus the total match count.
    pub async fn list_users(
        &self,
        search: Option<&str>,
        page: u64,
        limit: u64,
    ) -> ServiceResult<(Vec<user::Model>, u64)> {
        let mut query = User::find().order_by_desc(user::Column::CreatedAt);

        if let Some(term) = search.map(str::trim).filter(|term| !term.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(user::Column::Email.contains(term))
                    .add(user::Column::FirstName.contains(term))
                    .add(user::Column::LastName.contains(term)),
            );
        }

        let paginator = query.paginate(&self.db, limit.max(1));
        let total = paginator.num_items().await?;
        let users = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((users, total))
    }

    pub async fn find_user_by_id(&self, user_id: Uuid) -> ServiceResult<user::Model> {
        User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(ServiceError::NotFound("User"))
    }

    pub async fn roles_for(&self, user: &user::Model) -> ServiceResult<Vec<role::Model>> {
        Ok(user
            .find_related(Role)
            .order_by_asc(role::Column::Name)
            .all(&self.db)
            .await?)
    }

    pub async fn create_user(&self, input: NewUser) -> ServiceResult<user::Model> {
        let email = normalize_email(&input.email)?;
        validate_password(&input.password)?;
        let first_name = required_name(&input.first_name, "First name")?;
        let last_name = required_name(&input.last_name, "Last name")?;

        self.ensure_email_available(&email, None).await?;

        let role_ids = if input.role_ids.is_empty() {
            vec![self.default_role_id().await?]
        } else {
            input.role_ids
        };
        self.ensure_roles_exist(&role_ids).await?;

        let password_hash = hash(&input.password, self.bcrypt_cost)?;
        let now = Utc::now();
        let new_user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(password_hash),
            first_name: Set(first_name),
            last_name: Set(last_name),
            phone: Set(optional_text(input.phone)),
            avatar: Set(None),
            is_active: Set(input.is_active),
            email_verified: Set(false),
            last_login_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let txn = self.db.begin().await?;
        let user = new_user.insert(&txn).await?;
        replace_roles(&txn, user.id, &role_ids).await?;
        txn.commit().await?;

        Ok(user)
    }

    pub async fn update_user(&self, user_id: Uuid, changes: UserChanges) -> ServiceResult<user::Model> {
        let user = self.find_user_by_id(user_id).await?;
        let mut user_active: user::ActiveModel = user.into();

        // Every check runs before the transaction opens; writes happen together below.
        if let Some(email) = changes.email {
            let email = normalize_email(&email)?;
            self.ensure_email_available(&email, Some(user_id)).await?;
            user_active.email = Set(email);
        }
        if let Some(first_name) = changes.first_name {
            user_active.first_name = Set(required_name(&first_name, "First name")?);
        }
        if let Some(last_name) = changes.last_name {
            user_active.last_name = Set(required_name(&last_name, "Last name")?);
        }
        if let Some(phone) = changes.phone {
            user_active.phone = Set(optional_text(Some(phone)));
        }
        if let Some(is_active) = changes.is_active {
            user_active.is_active = Set(is_active);
        }
        if let Some(password) = changes.password {
            validate_password(&password)?;
            user_active.password_hash = Set(hash(&password, self.bcrypt_cost)?);
        }
        if let Some(role_ids) = &changes.role_ids {
            if role_ids.is_empty() {
                return Err(ServiceError::Validation(
                    "A user must keep at least one role".to_string(),
                ));
            }
            self.ensure_roles_exist(role_ids).await?;
        }

        user_active.updated_at = Set(Utc::now().into());

        let txn = self.db.begin().await?;
        let updated = user_active.update(&txn).await?;
        if let Some(role_ids) = changes.role_ids {
            replace_roles(&txn, user_id, &role_ids).await?;
        }
        txn.commit().await?;

        Ok(updated)
    }

    pub async fn delete_user(&self, user_id: Uuid, actor_id: Uuid) -> ServiceResult<user::Model> {
        if user_id == actor_id {
            return Err(ServiceError::Validation(
                "You cannot delete your own account".to_string(),
            ));
        }

        let user = self.find_user_by_id(user_id).await?;

        let txn = self.db.begin().await?;
        UserRole::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        User::delete_by_id(user_id).exec(&txn).await?;
        txn.commit().await?;

        Ok(user)
    }

    async fn ensure_email_available(&self, email: &str, except: Option<Uuid>) -> ServiceResult<()> {
        let existing = User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        match existing {
            Some(found) if Some(found.id) != except => Err(ServiceError::Conflict(
                "User with this email already exists".to_string(),
            )),
            _ => Ok(()),
        }
    }

    async fn default_role_id(&self) -> ServiceResult<Uuid> {
        Role::find()
            .filter(role::Column::Name.eq(USER_ROLE))
            .one(&self.db)
            .await?
            .map(|role| role.id)
            .ok_or(ServiceError::NotFound("Default role"))
    }

    async fn ensure_roles_exist(&self, role_ids: &[Uuid]) -> ServiceResult<()> {
        let found = Role::find()
            .filter(role::Column::Id.is_in(role_ids.iter().copied()))
            .count(&self.db)
            .await?;

        let mut unique = role_ids.to_vec();
        unique.sort_unstable();
        unique.dedup();
        if found != unique.len() as u64 {
            return Err(ServiceError::Validation("Unknown role id".to_string()));
        }
        Ok(())
    }
}

/// Swaps the user's role assignments for `role_ids`.
///
/// Callers pass an open transaction so a failed insert leaves the old assignments.
async fn replace_roles<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    role_ids: &[Uuid],
) -> ServiceResult<()> {
    UserRole::delete_many()
        .filter(user_role::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    let mut role_ids = role_ids.to_vec();
    role_ids.sort_unstable();
    role_ids.dedup();

    for role_id in role_ids {
        let assignment = user_role::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            role_id: Set(role_id),
            created_at: Set(Utc::now().into()),
        };
        assignment.insert(db).await?;
    }

    Ok(())
}

/// Lower-cases and trims an address, rejecting anything without `local@domain.tld`.
pub fn normalize_email(email: &str) -> ServiceResult<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
        }
        None => false,
    };

    if !valid {
        return Err(ServiceError::Validation("Invalid email address".to_string()));
    }
    Ok(email)
}

pub fn validate_password(password: &str) -> ServiceResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ServiceError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

pub(crate) fn required_name(value: &str, field: &str) -> ServiceResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::Validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

/// Blank strings are stored as NULL.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_lowercases_and_trims() {
        assert_eq!(
            normalize_email("  Jane.Doe@Example.COM ").unwrap(),
            "jane.doe@example.com"
        );
    }

    #[test]
    fn normalize_email_rejects_malformed_addresses() {
        for bad in ["", "plain", "@example.com", "user@localhost", "user@.com", "a@b@c.com"] {
            assert!(normalize_email(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn password_length_counts_characters_not_bytes() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("كلمةسرية").is_ok());
    }

    #[test]
    fn optional_text_drops_blank_values() {
        assert_eq!(optional_text(Some("   ".to_string())), None);
        assert_eq!(optional_text(Some(" 0555 ".to_string())), Some("0555".to_string()));
        assert_eq!(optional_text(None), None);
    }
}
