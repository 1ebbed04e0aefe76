pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod entities;
pub mod error;
pub mod health;
pub mod logging;
pub mod seed;
pub mod services;

pub use app::{build_router, AppState};
pub use config::AppConfig;
