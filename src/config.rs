use std::env;

use anyhow::{Context, Result};
use tracing::warn;

const DEFAULT_JWT_SECRET: &str = "default-secret-change-in-production";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub bcrypt_cost: u32,
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Reads the server configuration from the process environment.
    ///
    /// `.env` is expected to have been loaded by the caller.
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using default (not secure for production)");
            DEFAULT_JWT_SECRET.to_string()
        });
        let jwt_expiration_hours = env::var("JWT_EXPIRATION_HOURS")
            .ok()
            .and_then(|raw| raw.parse::<i64>().ok())
            .unwrap_or(24);
        let bcrypt_cost = env::var("BCRYPT_COST")
            .ok()
            .and_then(|raw| raw.parse::<u32>().ok())
            .unwrap_or(bcrypt::DEFAULT_COST);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let cors_allowed_origins = parse_origins(
            &env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string()),
        );

        Ok(Self {
            database_url,
            host,
            port,
            environment: environment_name(),
            jwt_secret,
            jwt_expiration_hours,
            bcrypt_cost,
            cors_allowed_origins,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

/// Railway sets `RAILWAY_ENVIRONMENT_NAME`; everything else uses `ENVIRONMENT`.
pub fn environment_name() -> String {
    env::var("RAILWAY_ENVIRONMENT_NAME")
        .or_else(|_| env::var("ENVIRONMENT"))
        .unwrap_or_else(|_| "development".to_string())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_origins_skips_blank_entries() {
        let origins = parse_origins(" http://a.test , ,http://b.test,");
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn parse_origins_keeps_wildcard() {
        assert_eq!(parse_origins("*"), vec!["*"]);
    }
}
