//! Idempotent baseline seeding.
//!
//! Every row is written through [`insert_if_absent`]: a row that already exists under
//! its unique key is returned as-is, so re-running the seed never duplicates rows or
//! overwrites values an operator has changed since.

pub mod data;

use bcrypt::hash;
use chrono::Utc;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr,
    EntityTrait, IntoActiveModel, QueryFilter, Set,
};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::entities::{permission, prelude::*, role, role_permission, setting, user, user_role};

use data::{RoleSeed, SettingSeed};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("failed to hash administrator password: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
}

/// Rows created by one seed run; rows that already existed are not counted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub roles: usize,
    pub permissions: usize,
    pub role_permissions: usize,
    pub users: usize,
    pub user_roles: usize,
    pub settings: usize,
}

impl SeedSummary {
    pub fn total(&self) -> usize {
        self.roles
            + self.permissions
            + self.role_permissions
            + self.users
            + self.user_roles
            + self.settings
    }
}

pub struct Upserted<M> {
    pub model: M,
    pub created: bool,
}

/// Inserts `model` unless a row matching `key` already exists.
///
/// The existing row is returned untouched on conflict.
pub async fn insert_if_absent<A, C>(
    db: &C,
    key: Condition,
    model: A,
) -> Result<Upserted<<A::Entity as EntityTrait>::Model>, DbErr>
where
    C: ConnectionTrait,
    A: ActiveModelTrait + ActiveModelBehavior + Send,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    if let Some(existing) = <A::Entity as EntityTrait>::find().filter(key).one(db).await? {
        return Ok(Upserted {
            model: existing,
            created: false,
        });
    }

    let model = model.insert(db).await?;
    Ok(Upserted {
        model,
        created: true,
    })
}

/// Brings the database to its baseline state.
///
/// Steps run in order because later steps reference rows created by earlier ones.
pub async fn run<C: ConnectionTrait>(db: &C) -> Result<SeedSummary, SeedError> {
    let mut summary = SeedSummary::default();

    info!("🌱 Seeding roles...");
    let mut admin_role = None;
    for seed in &data::ROLES {
        let upserted = ensure_role(db, seed).await?;
        summary.roles += usize::from(upserted.created);
        if seed.name == data::ADMIN_ROLE {
            admin_role = Some(upserted.model);
        }
    }
    let admin_role = admin_role
        .ok_or_else(|| DbErr::Custom(format!("{} role missing from seed data", data::ADMIN_ROLE)))?;

    info!("🌱 Seeding permissions...");
    for (name, description) in data::PERMISSIONS {
        let upserted = ensure_permission(db, name, description).await?;
        summary.permissions += usize::from(upserted.created);
    }

    summary.role_permissions = grant_all_permissions(db, admin_role.id).await?;
    info!(granted = summary.role_permissions, "✅ Admin role holds every permission");

    let admin = ensure_admin_user(db).await?;
    summary.users += usize::from(admin.created);

    let assignment = ensure_user_role(db, admin.model.id, admin_role.id).await?;
    summary.user_roles += usize::from(assignment.created);

    info!("🌱 Seeding settings...");
    for seed in &data::SETTINGS {
        let upserted = ensure_setting(db, seed).await?;
        summary.settings += usize::from(upserted.created);
    }

    Ok(summary)
}

async fn ensure_role<C: ConnectionTrait>(
    db: &C,
    seed: &RoleSeed,
) -> Result<Upserted<role::Model>, DbErr> {
    let now = Utc::now();
    let upserted = insert_if_absent(
        db,
        Condition::all().add(role::Column::Name.eq(seed.name)),
        role::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(seed.name.to_string()),
            display_name: Set(seed.display_name.to_string()),
            description: Set(Some(seed.description.to_string())),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        },
    )
    .await?;

    if upserted.created {
        info!("✅ Created role: {}", seed.name);
    }
    Ok(upserted)
}

async fn ensure_permission<C: ConnectionTrait>(
    db: &C,
    name: &str,
    description: &str,
) -> Result<Upserted<permission::Model>, DbErr> {
    let now = Utc::now();
    let upserted = insert_if_absent(
        db,
        Condition::all().add(permission::Column::Name.eq(name)),
        permission::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(Some(description.to_string())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        },
    )
    .await?;

    if upserted.created {
        info!("✅ Created permission: {}", name);
    }
    Ok(upserted)
}

/// Grants every permission currently in storage to `role_id`.
///
/// Covers permissions added outside this seed revision too. Returns the number of
/// new grants.
pub async fn grant_all_permissions<C: ConnectionTrait>(
    db: &C,
    role_id: Uuid,
) -> Result<usize, DbErr> {
    let permissions = Permission::find().all(db).await?;

    let mut granted = 0;
    for permission in permissions {
        let upserted = insert_if_absent(
            db,
            Condition::all()
                .add(role_permission::Column::RoleId.eq(role_id))
                .add(role_permission::Column::PermissionId.eq(permission.id)),
            role_permission::ActiveModel {
                id: Set(Uuid::new_v4()),
                role_id: Set(role_id),
                permission_id: Set(permission.id),
                created_at: Set(Utc::now().into()),
            },
        )
        .await?;

        if upserted.created {
            debug!("Granted {} to role {}", permission.name, role_id);
            granted += 1;
        }
    }

    Ok(granted)
}

async fn ensure_admin_user<C: ConnectionTrait>(
    db: &C,
) -> Result<Upserted<user::Model>, SeedError> {
    let password_hash = hash(data::ADMIN_PASSWORD, data::PASSWORD_HASH_COST)?;

    let now = Utc::now();
    let upserted = insert_if_absent(
        db,
        Condition::all().add(user::Column::Email.eq(data::ADMIN_EMAIL)),
        user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(data::ADMIN_EMAIL.to_string()),
            password_hash: Set(password_hash),
            first_name: Set(data::ADMIN_FIRST_NAME.to_string()),
            last_name: Set(data::ADMIN_LAST_NAME.to_string()),
            phone: Set(None),
            avatar: Set(None),
            is_active: Set(true),
            email_verified: Set(true), // Admin user is pre-verified
            last_login_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        },
    )
    .await?;

    if upserted.created {
        info!("✅ Admin user created: {}", data::ADMIN_EMAIL);
    } else {
        info!("✅ Admin user already exists, leaving it untouched");
    }
    Ok(upserted)
}

async fn ensure_user_role<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    role_id: Uuid,
) -> Result<Upserted<user_role::Model>, DbErr> {
    insert_if_absent(
        db,
        Condition::all()
            .add(user_role::Column::UserId.eq(user_id))
            .add(user_role::Column::RoleId.eq(role_id)),
        user_role::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            role_id: Set(role_id),
            created_at: Set(Utc::now().into()),
        },
    )
    .await
}

async fn ensure_setting<C: ConnectionTrait>(
    db: &C,
    seed: &SettingSeed,
) -> Result<Upserted<setting::Model>, DbErr> {
    let now = Utc::now();
    let upserted = insert_if_absent(
        db,
        Condition::all().add(setting::Column::Key.eq(seed.key)),
        setting::ActiveModel {
            id: Set(Uuid::new_v4()),
            key: Set(seed.key.to_string()),
            value: Set(seed.value.to_string()),
            description: Set(Some(seed.description.to_string())),
            category: Set(seed.category.to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        },
    )
    .await?;

    if upserted.created {
        info!("✅ Created setting: {}", seed.key);
    }
    Ok(upserted)
}
