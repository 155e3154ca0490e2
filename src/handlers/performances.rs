// Performance snapshot CRUD. Mutations are manager-or-admin; agents can
// read their own rows only.
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::{ValidId, ValidJson};
use crate::middleware::{guards, CurrentUser};
use crate::models::{Performance, PerformancePeriod, Role, UserRef};
use crate::state::AppState;
use crate::store::{Filter, Repo};

use super::{merge_patch, stamp_updated};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePerformanceBody {
    #[serde(rename = "userID")]
    pub user_id: Option<Uuid>,
    pub period: Option<PerformancePeriod>,
    pub total_sales: Option<i64>,
    pub total_revenue: Option<f64>,
    pub conversion_rate: Option<f64>,
    pub period_start: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePerformanceBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<PerformancePeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_sales: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_revenue: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_start: Option<DateTime<Utc>>,
}

fn ensure_readable(user: &CurrentUser, owner: Uuid) -> Result<(), ApiError> {
    match user.role {
        Role::Admin | Role::Manager => Ok(()),
        Role::Agent if user.id == owner => Ok(()),
        Role::Agent => Err(ApiError::forbidden(
            "Not authorized to access this performance record",
        )),
    }
}

pub async fn create_performance(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidJson(body): ValidJson<CreatePerformanceBody>,
) -> Result<(StatusCode, Json<Performance>), ApiError> {
    guards::ensure_manager_or_admin(&user)?;

    let period = body
        .period
        .ok_or_else(|| ApiError::bad_request("period is required"))?;

    let owner = body.user_id.unwrap_or(user.id);
    if owner != user.id {
        UserRef(owner).resolve(state.store.as_ref()).await?;
    }

    let now = Utc::now();
    let performance = Performance {
        id: Uuid::new_v4(),
        user_id: owner,
        period,
        total_sales: body.total_sales.unwrap_or(0),
        total_revenue: body.total_revenue.unwrap_or(0.0),
        conversion_rate: body.conversion_rate.unwrap_or(0.0),
        period_start: body.period_start.unwrap_or(now),
        created_at: now,
        updated_at: now,
    };

    Repo::<Performance>::new(state.store.as_ref())
        .insert(&performance)
        .await?;
    Ok((StatusCode::CREATED, Json(performance)))
}

pub async fn list_performances(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<Performance>>, ApiError> {
    let filter = match user.role {
        Role::Admin | Role::Manager => Filter::new(),
        Role::Agent => Filter::new().eq("userID", user.id),
    };
    let performances = Repo::<Performance>::new(state.store.as_ref())
        .list(&filter)
        .await?;
    Ok(Json(performances))
}

pub async fn get_performance(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidId(id): ValidId,
) -> Result<Json<Performance>, ApiError> {
    let performance = find_performance(&state, id).await?;
    ensure_readable(&user, performance.user_id)?;
    Ok(Json(performance))
}

pub async fn update_performance(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidId(id): ValidId,
    ValidJson(body): ValidJson<UpdatePerformanceBody>,
) -> Result<Json<Performance>, ApiError> {
    guards::ensure_manager_or_admin(&user)?;

    let mut patch = merge_patch(&body)?;
    stamp_updated(&mut patch);

    let updated = Repo::<Performance>::new(state.store.as_ref())
        .update_merge(id, Value::Object(patch))
        .await?
        .ok_or_else(|| ApiError::not_found("Performance record not found"))?;
    Ok(Json(updated))
}

pub async fn delete_performance(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidId(id): ValidId,
) -> Result<Json<Value>, ApiError> {
    guards::ensure_manager_or_admin(&user)?;

    let removed = Repo::<Performance>::new(state.store.as_ref())
        .delete(id)
        .await?;
    if !removed {
        return Err(ApiError::not_found("Performance record not found"));
    }
    Ok(Json(json!({"message": "Performance record deleted"})))
}

async fn find_performance(state: &AppState, id: Uuid) -> Result<Performance, ApiError> {
    Repo::<Performance>::new(state.store.as_ref())
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Performance record not found"))
}
