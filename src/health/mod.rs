//! Health, readiness and liveness probes.
//!
//! None of these handlers mutate application state.

pub mod metrics;

use std::collections::BTreeMap;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use strum::Display;
use tracing::warn;

use crate::app::AppState;
use crate::error::ApiResult;

pub use metrics::{CpuUsage, HealthMonitor, MemoryUsage, ResourceSample, SystemMemory};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum CheckStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum HealthStatus {
    Ok,
    Degraded,
}

pub type Checks = BTreeMap<&'static str, CheckStatus>;

/// `Ok` only when every sub-check is `Ok`.
pub fn aggregate(checks: &Checks) -> HealthStatus {
    if checks.values().all(|status| *status == CheckStatus::Ok) {
        HealthStatus::Ok
    } else {
        HealthStatus::Degraded
    }
}

#[derive(Debug, Serialize)]
struct Envelope<T: Serialize> {
    success: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct BasicHealth {
    status: HealthStatus,
    timestamp: String,
    uptime: f64,
    environment: String,
    version: &'static str,
    memory: MemoryUsage,
    cpu: CpuUsage,
}

#[derive(Debug, Serialize)]
struct DetailedHealth {
    status: HealthStatus,
    timestamp: String,
    uptime: f64,
    environment: String,
    version: &'static str,
    checks: Checks,
    system: SystemInfo,
}

#[derive(Debug, Serialize)]
struct SystemInfo {
    memory: SystemMemory,
    cpu: CpuUsage,
    platform: &'static str,
    arch: &'static str,
    runtime: &'static str,
}

#[derive(Debug, Serialize)]
struct ProbeResponse {
    success: bool,
    message: &'static str,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    uptime: Option<f64>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(basic_health))
        .route("/detailed", get(detailed_health))
        .route("/ready", get(readiness))
        .route("/live", get(liveness))
}

async fn basic_health(State(state): State<AppState>) -> ApiResult<Response> {
    let sample = state.health.sample();

    let body = Envelope {
        success: true,
        data: BasicHealth {
            status: HealthStatus::Ok,
            timestamp: Utc::now().to_rfc3339(),
            uptime: state.health.uptime(),
            environment: state.config.environment.clone(),
            version: VERSION,
            memory: sample.memory(),
            cpu: sample.cpu(),
        },
    };

    Ok((StatusCode::OK, Json(body)).into_response())
}

async fn detailed_health(State(state): State<AppState>) -> ApiResult<Response> {
    let checks = run_checks(&state).await;
    let status = aggregate(&checks);
    let healthy = status == HealthStatus::Ok;
    if !healthy {
        warn!(?checks, "health check degraded");
    }

    let sample = state.health.sample();
    let body = Envelope {
        success: healthy,
        data: DetailedHealth {
            status,
            timestamp: Utc::now().to_rfc3339(),
            uptime: state.health.uptime(),
            environment: state.config.environment.clone(),
            version: VERSION,
            checks,
            system: SystemInfo {
                memory: sample.system_memory(),
                cpu: sample.cpu(),
                platform: std::env::consts::OS,
                arch: std::env::consts::ARCH,
                runtime: concat!("rust ", env!("CARGO_PKG_RUST_VERSION")),
            },
        },
    };

    let code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    Ok((code, Json(body)).into_response())
}

async fn run_checks(state: &AppState) -> Checks {
    let mut checks = Checks::new();
    checks.insert("server", CheckStatus::Ok);
    checks.insert("database", database_check(state).await);
    // Placeholders until a cache and object store are wired in.
    checks.insert("redis", CheckStatus::Ok);
    checks.insert("storage", CheckStatus::Ok);
    checks
}

async fn database_check(state: &AppState) -> CheckStatus {
    match state.db.ping().await {
        Ok(()) => CheckStatus::Ok,
        Err(err) => {
            warn!("database health probe failed: {}", err);
            CheckStatus::Error
        }
    }
}

/// Always ready: there is no dependency gating yet.
fn service_ready(_state: &AppState) -> bool {
    true
}

async fn readiness(State(state): State<AppState>) -> ApiResult<Response> {
    let timestamp = Utc::now().to_rfc3339();

    if service_ready(&state) {
        let body = ProbeResponse {
            success: true,
            message: "Service is ready",
            timestamp,
            uptime: None,
        };
        Ok((StatusCode::OK, Json(body)).into_response())
    } else {
        let body = ProbeResponse {
            success: false,
            message: "Service is not ready",
            timestamp,
            uptime: None,
        };
        Ok((StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response())
    }
}

async fn liveness(State(state): State<AppState>) -> ApiResult<Response> {
    let body = ProbeResponse {
        success: true,
        message: "Service is alive",
        timestamp: Utc::now().to_rfc3339(),
        uptime: Some(state.health.uptime()),
    };
    Ok((StatusCode::OK, Json(body)).into_response())
}
