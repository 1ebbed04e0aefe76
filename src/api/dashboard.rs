use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::api::{
    query_params,
    types::{ActivityDto, RecentActivityResponse},
    ApiResponse,
};
use crate::app::AppState;
use crate::auth::AuthenticatedUser;
use crate::error::ApiResult;
use crate::services::DashboardStats;

const DEFAULT_ACTIVITY_LIMIT: u64 = 10;
const MAX_ACTIVITY_LIMIT: u64 = 50;

#[derive(Debug, Deserialize)]
pub struct RecentActivityQuery {
    pub limit: Option<u64>,
}

pub async fn stats(
    State(state): State<AppState>,
    Extension(_caller): Extension<AuthenticatedUser>,
) -> ApiResult<ApiResponse<DashboardStats>> {
    let stats = state.dashboard_service.stats().await?;
    Ok(ApiResponse::ok(stats))
}

pub async fn recent_activity(
    State(state): State<AppState>,
    Extension(_caller): Extension<AuthenticatedUser>,
    query: Result<Query<RecentActivityQuery>, QueryRejection>,
) -> ApiResult<Json<RecentActivityResponse>> {
    let limit = query_params(query)?
        .limit
        .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
        .clamp(1, MAX_ACTIVITY_LIMIT);

    let activities = state
        .activity_service
        .recent(limit)
        .await?
        .into_iter()
        .map(|(entry, actor)| ActivityDto::new(entry, actor))
        .collect();

    Ok(Json(RecentActivityResponse {
        success: true,
        activities,
    }))
}
