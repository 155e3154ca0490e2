// Sales target CRUD with the ordered creation checks.
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
use crate::models::{Target, TargetPeriod, TargetStatus, UserRef};
use crate::state::AppState;
use crate::store::{Filter, Repo};

use super::{merge_patch, stamp_updated};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTargetBody {
    #[serde(rename = "userID")]
    pub user_id: Option<Uuid>,
    pub target_amount: Option<f64>,
    pub achieved: Option<f64>,
    pub period: Option<TargetPeriod>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<TargetStatus>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTargetBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achieved: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<TargetPeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TargetStatus>,
}

fn visibility(user: &CurrentUser) -> Filter {
    if user.role.is_admin() {
        Filter::new()
    } else {
        Filter::new().eq("userID", user.id)
    }
}

/// Creation checks run in a fixed order and stop at the first failure, each
/// with its own message. Nothing is persisted unless all of them pass.
pub async fn create_target(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidJson(body): ValidJson<CreateTargetBody>,
) -> Result<(StatusCode, Json<Target>), ApiError> {
    let target_amount = body
        .target_amount
        .filter(|a| *a > 0.0)
        .ok_or_else(|| {
            ApiError::bad_request("targetAmount is required and must be greater than zero")
        })?;
    let period = body
        .period
        .ok_or_else(|| ApiError::bad_request("period is required"))?;
    let start_date = body
        .start_date
        .ok_or_else(|| ApiError::bad_request("startDate is required"))?;
    let end_date = body
        .end_date
        .ok_or_else(|| ApiError::bad_request("endDate is required"))?;
    if end_date <= start_date {
        return Err(ApiError::bad_request("endDate must be after startDate"));
    }

    // Targets default to the caller; assigning one to somebody else is a
    // manager-or-admin action and the assignee must exist.
    let owner = body.user_id.unwrap_or(user.id);
    if owner != user.id {
        guards::ensure_manager_or_admin(&user)?;
        UserRef(owner).resolve(state.store.as_ref()).await?;
    }

    let now = Utc::now();
    let target = Target {
        id: Uuid::new_v4(),
        user_id: owner,
        target_amount,
        achieved: body.achieved.unwrap_or(0.0),
        period,
        start_date,
        end_date,
        status: body.status.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };

    Repo::<Target>::new(state.store.as_ref())
        .insert(&target)
        .await?;
    Ok((StatusCode::CREATED, Json(target)))
}

pub async fn list_targets(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<Target>>, ApiError> {
    let targets = Repo::<Target>::new(state.store.as_ref())
        .list(&visibility(&user))
        .await?;
    Ok(Json(targets))
}

pub async fn get_target(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidId(id): ValidId,
) -> Result<Json<Target>, ApiError> {
    let target = find_target(&state, id).await?;
    guards::ensure_owner_or_admin(&user, target.user_id, "target")?;
    Ok(Json(target))
}

pub async fn update_target(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidId(id): ValidId,
    ValidJson(body): ValidJson<UpdateTargetBody>,
) -> Result<Json<Target>, ApiError> {
    let target = find_target(&state, id).await?;
    guards::ensure_owner_or_admin(&user, target.user_id, "target")?;

    if let Some(amount) = body.target_amount {
        if amount <= 0.0 {
            return Err(ApiError::bad_request(
                "targetAmount must be greater than zero",
            ));
        }
    }

    // Date checks consider the effective pair after the merge.
    let start_date = body.start_date.unwrap_or(target.start_date);
    let end_date = body.end_date.unwrap_or(target.end_date);
    if end_date <= start_date {
        return Err(ApiError::bad_request("endDate must be after startDate"));
    }

    if let Some(next) = body.status {
        if target.status != TargetStatus::InProgress && next != target.status {
            return Err(ApiError::bad_request("Target is already finalized"));
        }
    }

    let mut patch = merge_patch(&body)?;
    stamp_updated(&mut patch);

    let updated = Repo::<Target>::new(state.store.as_ref())
        .update_merge(id, Value::Object(patch))
        .await?
        .ok_or_else(|| ApiError::not_found("Target not found"))?;
    Ok(Json(updated))
}

pub async fn delete_target(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidId(id): ValidId,
) -> Result<Json<Value>, ApiError> {
    let target = find_target(&state, id).await?;
    guards::ensure_owner_or_admin(&user, target.user_id, "target")?;

    Repo::<Target>::new(state.store.as_ref()).delete(id).await?;
    Ok(Json(json!({"message": "Target deleted"})))
}

async fn find_target(state: &AppState, id: Uuid) -> Result<Target, ApiError> {
    Repo::<Target>::new(state.store.as_ref())
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Target not found"))
}
