// Audit log CRUD. The whole group sits behind the admin route guard.
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::{ValidId, ValidJson};
use crate::middleware::CurrentUser;
use crate::models::AuditLog;
use crate::state::AppState;
use crate::store::{Filter, Repo};

use super::{merge_patch, stamp_updated};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuditLogBody {
    pub action: Option<String>,
    pub entity_type: Option<String>,
    #[serde(rename = "entityID")]
    pub entity_id: Option<Uuid>,
    pub details: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuditLogBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

pub async fn create_audit_log(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidJson(body): ValidJson<CreateAuditLogBody>,
) -> Result<(StatusCode, Json<AuditLog>), ApiError> {
    let action = body
        .action
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .ok_or_else(|| ApiError::bad_request("Action is required"))?;

    let now = Utc::now();
    let entry = AuditLog {
        id: Uuid::new_v4(),
        user_id: user.id,
        action,
        entity_type: body.entity_type,
        entity_id: body.entity_id,
        details: body.details,
        created_at: now,
        updated_at: now,
    };

    Repo::<AuditLog>::new(state.store.as_ref())
        .insert(&entry)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn list_audit_logs(
    State(state): State<AppState>,
) -> Result<Json<Vec<AuditLog>>, ApiError> {
    let entries = Repo::<AuditLog>::new(state.store.as_ref())
        .list(&Filter::new())
        .await?;
    Ok(Json(entries))
}

pub async fn get_audit_log(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> Result<Json<AuditLog>, ApiError> {
    let entry = Repo::<AuditLog>::new(state.store.as_ref())
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Audit log entry not found"))?;
    Ok(Json(entry))
}

pub async fn update_audit_log(
    State(state): State<AppState>,
    ValidId(id): ValidId,
    ValidJson(body): ValidJson<UpdateAuditLogBody>,
) -> Result<Json<AuditLog>, ApiError> {
    let mut patch = merge_patch(&body)?;
    stamp_updated(&mut patch);

    let updated = Repo::<AuditLog>::new(state.store.as_ref())
        .update_merge(id, Value::Object(patch))
        .await?
        .ok_or_else(|| ApiError::not_found("Audit log entry not found"))?;
    Ok(Json(updated))
}

pub async fn delete_audit_log(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> Result<Json<Value>, ApiError> {
    let removed = Repo::<AuditLog>::new(state.store.as_ref())
        .delete(id)
        .await?;
    if !removed {
        return Err(ApiError::not_found("Audit log entry not found"));
    }
    Ok(Json(json!({"message": "Audit log entry deleted"})))
}
