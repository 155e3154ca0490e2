// Sale CRUD. Creation cross-checks the referenced customer's owner.
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
use crate::models::{CustomerRef, Sale, SaleRef, SaleStatus};
use crate::state::AppState;
use crate::store::{Filter, Repo};

use super::{merge_patch, stamp_updated};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleBody {
    #[serde(rename = "customerID")]
    pub customer_id: Option<Uuid>,
    pub amount: Option<f64>,
    pub status: Option<SaleStatus>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// Reference fields are absent on purpose: `agentID` always comes from the
/// caller and `customerID` is fixed at creation.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSaleBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SaleStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

fn visibility(user: &CurrentUser) -> Filter {
    if user.role.is_admin() {
        Filter::new()
    } else {
        Filter::new().eq("agentID", user.id)
    }
}

pub async fn create_sale(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidJson(body): ValidJson<CreateSaleBody>,
) -> Result<(StatusCode, Json<Sale>), ApiError> {
    let customer_id = body
        .customer_id
        .ok_or_else(|| ApiError::bad_request("customerID is required"))?;
    let amount = body
        .amount
        .ok_or_else(|| ApiError::bad_request("Sale amount is required"))?;
    if amount <= 0.0 {
        return Err(ApiError::bad_request(
            "Sale amount must be greater than zero",
        ));
    }

    // Missing customer is a 404 before any ownership 403. Nothing is
    // persisted when either check fails.
    let customer = CustomerRef(customer_id).resolve(state.store.as_ref()).await?;
    guards::ensure_owner_or_admin(&user, customer.agent_id, "customer")?;

    let now = Utc::now();
    let sale = Sale {
        id: Uuid::new_v4(),
        customer_id,
        agent_id: user.id,
        amount,
        status: body.status.unwrap_or_default(),
        description: body.description,
        date: body.date.unwrap_or(now),
        created_at: now,
        updated_at: now,
    };

    Repo::<Sale>::new(state.store.as_ref()).insert(&sale).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

pub async fn list_sales(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<Sale>>, ApiError> {
    let sales = Repo::<Sale>::new(state.store.as_ref())
        .list(&visibility(&user))
        .await?;
    Ok(Json(sales))
}

pub async fn get_sale(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidId(id): ValidId,
) -> Result<Json<Sale>, ApiError> {
    let sale = SaleRef(id).resolve(state.store.as_ref()).await?;
    guards::ensure_owner_or_admin(&user, sale.agent_id, "sale")?;
    Ok(Json(sale))
}

pub async fn update_sale(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidId(id): ValidId,
    ValidJson(body): ValidJson<UpdateSaleBody>,
) -> Result<Json<Sale>, ApiError> {
    let sale = SaleRef(id).resolve(state.store.as_ref()).await?;
    guards::ensure_owner_or_admin(&user, sale.agent_id, "sale")?;

    if let Some(amount) = body.amount {
        if amount <= 0.0 {
            return Err(ApiError::bad_request(
                "Sale amount must be greater than zero",
            ));
        }
    }

    let mut patch = merge_patch(&body)?;
    stamp_updated(&mut patch);

    let updated = Repo::<Sale>::new(state.store.as_ref())
        .update_merge(id, Value::Object(patch))
        .await?
        .ok_or_else(|| ApiError::not_found("Sale not found"))?;
    Ok(Json(updated))
}

pub async fn delete_sale(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidId(id): ValidId,
) -> Result<Json<Value>, ApiError> {
    let sale = SaleRef(id).resolve(state.store.as_ref()).await?;
    guards::ensure_owner_or_admin(&user, sale.agent_id, "sale")?;

    Repo::<Sale>::new(state.store.as_ref()).delete(id).await?;
    Ok(Json(json!({"message": "Sale deleted"})))
}
