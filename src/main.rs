use anyhow::Context;
use dashboard_api::{build_router, logging, AppConfig, AppState};
use dotenvy::dotenv;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logging::init_tracing("dashboard_api=debug,tower_http=debug");

    let config = AppConfig::from_env()?;
    info!("🚀 Starting dashboard API in {} environment", config.environment);
    if !config.is_development() && config.cors_allowed_origins.iter().any(|o| o == "*") {
        warn!("🚨 Wildcard CORS origin configured outside development");
    }

    info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;
    info!("Database connected successfully");

    Migrator::up(&db, None)
        .await
        .context("failed to apply migrations")?;

    let addr = format!("{}:{}", config.host, config.port);
    let app = build_router(AppState::new(db, config));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("🚀 Server starting on http://{}", addr);
    info!("🏥 Health check available at http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    warn!("Received shutdown signal, draining connections...");
}
