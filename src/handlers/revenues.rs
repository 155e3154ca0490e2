// Revenue ledger CRUD. Reads are open to any authenticated caller;
// mutations are manager-or-admin.
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
use crate::models::{Revenue, SaleRef};
use crate::state::AppState;
use crate::store::{Filter, Repo};

use super::{merge_patch, stamp_updated};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRevenueBody {
    #[serde(rename = "saleID")]
    pub sale_id: Option<Uuid>,
    pub amount: Option<f64>,
    pub source: Option<String>,
    pub category: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRevenueBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

pub async fn create_revenue(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidJson(body): ValidJson<CreateRevenueBody>,
) -> Result<(StatusCode, Json<Revenue>), ApiError> {
    guards::ensure_manager_or_admin(&user)?;

    let sale_id = body
        .sale_id
        .ok_or_else(|| ApiError::bad_request("saleID is required"))?;
    let amount = body
        .amount
        .ok_or_else(|| ApiError::bad_request("Revenue amount is required"))?;

    SaleRef(sale_id).resolve(state.store.as_ref()).await?;

    let now = Utc::now();
    let revenue = Revenue {
        id: Uuid::new_v4(),
        sale_id,
        amount,
        source: body.source,
        category: body.category,
        date: body.date.unwrap_or(now),
        created_at: now,
        updated_at: now,
    };

    Repo::<Revenue>::new(state.store.as_ref())
        .insert(&revenue)
        .await?;
    Ok((StatusCode::CREATED, Json(revenue)))
}

pub async fn list_revenues(
    State(state): State<AppState>,
) -> Result<Json<Vec<Revenue>>, ApiError> {
    let revenues = Repo::<Revenue>::new(state.store.as_ref())
        .list(&Filter::new())
        .await?;
    Ok(Json(revenues))
}

pub async fn get_revenue(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> Result<Json<Revenue>, ApiError> {
    let revenue = Repo::<Revenue>::new(state.store.as_ref())
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Revenue record not found"))?;
    Ok(Json(revenue))
}

pub async fn update_revenue(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidId(id): ValidId,
    ValidJson(body): ValidJson<UpdateRevenueBody>,
) -> Result<Json<Revenue>, ApiError> {
    guards::ensure_manager_or_admin(&user)?;

    let mut patch = merge_patch(&body)?;
    stamp_updated(&mut patch);

    let updated = Repo::<Revenue>::new(state.store.as_ref())
        .update_merge(id, Value::Object(patch))
        .await?
        .ok_or_else(|| ApiError::not_found("Revenue record not found"))?;
    Ok(Json(updated))
}

pub async fn delete_revenue(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidId(id): ValidId,
) -> Result<Json<Value>, ApiError> {
    guards::ensure_manager_or_admin(&user)?;

    let removed = Repo::<Revenue>::new(state.store.as_ref()).delete(id).await?;
    if !removed {
        return Err(ApiError::not_found("Revenue record not found"));
    }
    Ok(Json(json!({"message": "Revenue record deleted"})))
}
