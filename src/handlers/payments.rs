// Payment CRUD. Payments reference a sale and customer but carry no owner;
// any authenticated caller may work with them.
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::{ValidId, ValidJson};
use crate::middleware::CurrentUser;
use crate::models::{Payment, PaymentMethod, PaymentStatus, SaleRef};
use crate::state::AppState;
use crate::store::{Filter, Repo};

use super::{merge_patch, stamp_updated};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentBody {
    #[serde(rename = "saleID")]
    pub sale_id: Option<Uuid>,
    #[serde(rename = "customerID")]
    pub customer_id: Option<Uuid>,
    pub amount: Option<f64>,
    pub method: Option<PaymentMethod>,
    pub status: Option<PaymentStatus>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

pub async fn create_payment(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    ValidJson(body): ValidJson<CreatePaymentBody>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    let sale_id = body
        .sale_id
        .ok_or_else(|| ApiError::bad_request("saleID is required"))?;
    let amount = body
        .amount
        .ok_or_else(|| ApiError::bad_request("Payment amount is required"))?;
    if amount <= 0.0 {
        return Err(ApiError::bad_request(
            "Payment amount must be greater than zero",
        ));
    }
    let method = body
        .method
        .ok_or_else(|| ApiError::bad_request("Payment method is required"))?;

    let sale = SaleRef(sale_id).resolve(state.store.as_ref()).await?;

    let now = Utc::now();
    let payment = Payment {
        id: Uuid::new_v4(),
        sale_id,
        // Defaults to the sale's customer when the payload omits it.
        customer_id: body.customer_id.unwrap_or(sale.customer_id),
        amount,
        method,
        status: body.status.unwrap_or_default(),
        date: body.date.unwrap_or(now),
        created_at: now,
        updated_at: now,
    };

    Repo::<Payment>::new(state.store.as_ref())
        .insert(&payment)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn list_payments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let payments = Repo::<Payment>::new(state.store.as_ref())
        .list(&Filter::new())
        .await?;
    Ok(Json(payments))
}

pub async fn get_payment(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> Result<Json<Payment>, ApiError> {
    let payment = Repo::<Payment>::new(state.store.as_ref())
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Payment not found"))?;
    Ok(Json(payment))
}

pub async fn update_payment(
    State(state): State<AppState>,
    ValidId(id): ValidId,
    ValidJson(body): ValidJson<UpdatePaymentBody>,
) -> Result<Json<Payment>, ApiError> {
    if let Some(amount) = body.amount {
        if amount <= 0.0 {
            return Err(ApiError::bad_request(
                "Payment amount must be greater than zero",
            ));
        }
    }

    let mut patch = merge_patch(&body)?;
    stamp_updated(&mut patch);

    let updated = Repo::<Payment>::new(state.store.as_ref())
        .update_merge(id, Value::Object(patch))
        .await?
        .ok_or_else(|| ApiError::not_found("Payment not found"))?;
    Ok(Json(updated))
}

pub async fn delete_payment(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> Result<Json<Value>, ApiError> {
    let removed = Repo::<Payment>::new(state.store.as_ref()).delete(id).await?;
    if !removed {
        return Err(ApiError::not_found("Payment not found"));
    }
    Ok(Json(json!({"message": "Payment deleted"})))
}
