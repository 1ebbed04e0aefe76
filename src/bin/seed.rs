//! Brings a database to its baseline state: applies pending migrations, then
//! upserts the default roles, permissions, administrator account and settings.
//!
//! Safe to run repeatedly.

use std::env;
use std::process::ExitCode;

use anyhow::Context;
use dashboard_api::{logging, seed};
use dotenvy::dotenv;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    logging::init_tracing("dashboard_api=info,seed=info");

    match run().await {
        Ok(summary) => {
            info!(
                roles = summary.roles,
                permissions = summary.permissions,
                role_permissions = summary.role_permissions,
                users = summary.users,
                user_roles = summary.user_roles,
                settings = summary.settings,
                "🎉 Seed completed, {} new rows",
                summary.total()
            );
            warn!(
                "⚠️ Default admin login: {} / {}",
                seed::data::ADMIN_EMAIL,
                seed::data::ADMIN_PASSWORD
            );
            warn!("⚠️ Change the admin password immediately after the first login!");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("❌ Seed failed: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<seed::SeedSummary> {
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    info!("Connecting to database...");
    let db = Database::connect(&database_url)
        .await
        .context("failed to connect to database")?;

    let result = async {
        Migrator::up(&db, None)
            .await
            .context("failed to apply migrations")?;
        seed::run(&db).await.context("seeding failed")
    }
    .await;

    if let Err(err) = db.close().await {
        warn!("failed to close database connection: {}", err);
    }

    result
}
