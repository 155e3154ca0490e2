// Dashboard endpoints; thin wrappers over the aggregation service. Role
// gating for the admin and agent views lives on the routes.
use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::services::dashboard::{DashboardService, DashboardSnapshot, Period, SummaryStats};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

pub async fn admin_dashboard(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<DashboardSnapshot>, ApiError> {
    let period = Period::parse(query.period.as_deref());
    let snapshot = DashboardService::new(state.store.as_ref())
        .snapshot(period, None)
        .await?;
    Ok(Json(snapshot))
}

pub async fn agent_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<DashboardSnapshot>, ApiError> {
    let period = Period::parse(query.period.as_deref());
    let snapshot = DashboardService::new(state.store.as_ref())
        .snapshot(period, Some(user.id))
        .await?;
    Ok(Json(snapshot))
}

pub async fn dashboard_summary(
    State(state): State<AppState>,
) -> Result<Json<SummaryStats>, ApiError> {
    let summary = DashboardService::new(state.store.as_ref())
        .summary()
        .await?;
    Ok(Json(summary))
}
