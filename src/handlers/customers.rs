// Customer CRUD, ownership-scoped per caller role.
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::{ValidId, ValidJson};
use crate::middleware::{guards, CurrentUser};
use crate::models::{Customer, CustomerRef, CustomerStatus};
use crate::state::AppState;
use crate::store::{Filter, Repo};

use super::{merge_patch, stamp_updated};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: Option<CustomerStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CustomerStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn visibility(user: &CurrentUser) -> Filter {
    if user.role.is_admin() {
        Filter::new()
    } else {
        Filter::new().eq("agentID", user.id)
    }
}

pub async fn create_customer(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidJson(body): ValidJson<CreateCustomerBody>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    let name = body
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::bad_request("Customer name is required"))?;

    let now = Utc::now();
    let customer = Customer {
        id: Uuid::new_v4(),
        name,
        email: body.email,
        phone: body.phone,
        company: body.company,
        status: body.status.unwrap_or_default(),
        notes: body.notes,
        // Owner comes from the caller; any agentID in the payload is ignored.
        agent_id: user.id,
        created_at: now,
        updated_at: now,
    };

    Repo::<Customer>::new(state.store.as_ref())
        .insert(&customer)
        .await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn list_customers(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    let customers = Repo::<Customer>::new(state.store.as_ref())
        .list(&visibility(&user))
        .await?;
    Ok(Json(customers))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidId(id): ValidId,
) -> Result<Json<Customer>, ApiError> {
    let customer = CustomerRef(id).resolve(state.store.as_ref()).await?;
    guards::ensure_owner_or_admin(&user, customer.agent_id, "customer")?;
    Ok(Json(customer))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidId(id): ValidId,
    ValidJson(body): ValidJson<UpdateCustomerBody>,
) -> Result<Json<Customer>, ApiError> {
    let customer = CustomerRef(id).resolve(state.store.as_ref()).await?;
    guards::ensure_owner_or_admin(&user, customer.agent_id, "customer")?;

    if let Some(name) = body.name.as_deref() {
        if name.trim().is_empty() {
            return Err(ApiError::bad_request("Customer name is required"));
        }
    }

    let mut patch = merge_patch(&body)?;
    stamp_updated(&mut patch);

    let updated = Repo::<Customer>::new(state.store.as_ref())
        .update_merge(id, Value::Object(patch))
        .await?
        .ok_or_else(|| ApiError::not_found("Customer not found"))?;
    Ok(Json(updated))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidId(id): ValidId,
) -> Result<Json<Value>, ApiError> {
    let customer = CustomerRef(id).resolve(state.store.as_ref()).await?;
    guards::ensure_owner_or_admin(&user, customer.agent_id, "customer")?;

    Repo::<Customer>::new(state.store.as_ref()).delete(id).await?;
    Ok(Json(json!({"message": "Customer deleted"})))
}
