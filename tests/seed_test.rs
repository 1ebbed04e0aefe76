mod common;

use chrono::Utc;
use dashboard_api::entities::{permission, prelude::*, role, role_permission, setting, user, user_role};
use dashboard_api::seed::{self, data};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use common::setup_test_db;

async fn counts(db: &sea_orm::DatabaseConnection) -> [u64; 6] {
    [
        Role::find().count(db).await.unwrap(),
        Permission::find().count(db).await.unwrap(),
        RolePermission::find().count(db).await.unwrap(),
        User::find().count(db).await.unwrap(),
        UserRole::find().count(db).await.unwrap(),
        Setting::find().count(db).await.unwrap(),
    ]
}

#[tokio::test]
async fn test_seed_creates_baseline_rows() {
    let db = setup_test_db().await;

    let summary = seed::run(&db).await.expect("seed succeeds");

    assert_eq!(summary.roles, 2);
    assert_eq!(summary.permissions, 9);
    assert_eq!(summary.role_permissions, 9);
    assert_eq!(summary.users, 1);
    assert_eq!(summary.user_roles, 1);
    assert_eq!(summary.settings, 4);
    assert_eq!(counts(&db).await, [2, 9, 9, 1, 1, 4]);
}

#[tokio::test]
async fn test_seed_is_idempotent() {
    let db = setup_test_db().await;
    seed::run(&db).await.expect("first run succeeds");
    let before = counts(&db).await;

    let second = seed::run(&db).await.expect("second run succeeds");

    assert_eq!(second.total(), 0, "nothing new on a re-run: {second:?}");
    assert_eq!(counts(&db).await, before);
}

#[tokio::test]
async fn test_admin_role_holds_every_permission() {
    let db = setup_test_db().await;
    seed::run(&db).await.unwrap();

    let admin = Role::find()
        .filter(role::Column::Name.eq(data::ADMIN_ROLE))
        .one(&db)
        .await
        .unwrap()
        .expect("admin role exists");
    let granted = RolePermission::find()
        .filter(role_permission::Column::RoleId.eq(admin.id))
        .count(&db)
        .await
        .unwrap();

    assert_eq!(granted, Permission::find().count(&db).await.unwrap());
}

#[tokio::test]
async fn test_rerun_grants_permissions_added_later() {
    let db = setup_test_db().await;
    seed::run(&db).await.unwrap();

    let now = Utc::now();
    permission::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("reports.export".to_string()),
        description: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&db)
    .await
    .unwrap();

    let summary = seed::run(&db).await.unwrap();

    assert_eq!(summary.permissions, 0);
    assert_eq!(summary.role_permissions, 1);
    assert_eq!(RolePermission::find().count(&db).await.unwrap(), 10);
}

#[tokio::test]
async fn test_admin_password_is_hashed() {
    let db = setup_test_db().await;
    seed::run(&db).await.unwrap();

    let admin = User::find()
        .filter(user::Column::Email.eq(data::ADMIN_EMAIL))
        .one(&db)
        .await
        .unwrap()
        .expect("admin user exists");

    assert_ne!(admin.password_hash, data::ADMIN_PASSWORD);
    assert!(bcrypt::verify(data::ADMIN_PASSWORD, &admin.password_hash).unwrap());
    assert!(admin.is_active);
    assert!(admin.email_verified);

    let assignments = UserRole::find()
        .filter(user_role::Column::UserId.eq(admin.id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(assignments, 1);
}

#[tokio::test]
async fn test_rerun_leaves_existing_rows_untouched() {
    let db = setup_test_db().await;
    seed::run(&db).await.unwrap();

    let admin_role = Role::find()
        .filter(role::Column::Name.eq(data::ADMIN_ROLE))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let mut admin_role = admin_role.into_active_model();
    admin_role.description = Set(Some("Edited by an operator".to_string()));
    admin_role.update(&db).await.unwrap();

    let app_name = Setting::find()
        .filter(setting::Column::Key.eq("app.name"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let mut app_name = app_name.into_active_model();
    app_name.value = Set("Acme Console".to_string());
    app_name.update(&db).await.unwrap();

    let admin = User::find()
        .filter(user::Column::Email.eq(data::ADMIN_EMAIL))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let original_hash = admin.password_hash.clone();

    seed::run(&db).await.unwrap();

    let role = Role::find()
        .filter(role::Column::Name.eq(data::ADMIN_ROLE))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(role.description.as_deref(), Some("Edited by an operator"));

    let setting = Setting::find()
        .filter(setting::Column::Key.eq("app.name"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(setting.value, "Acme Console");

    let admin = User::find_by_id(admin.id).one(&db).await.unwrap().unwrap();
    assert_eq!(admin.password_hash, original_hash);
}

#[tokio::test]
async fn test_seed_fails_on_unmigrated_database() {
    let db = Database::connect("sqlite::memory:").await.unwrap();

    let result = seed::run(&db).await;

    assert!(result.is_err());
}
