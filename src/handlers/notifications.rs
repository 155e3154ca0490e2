// Notification CRUD plus the mark-read shortcut. Every record belongs to a
// recipient; non-admin callers only ever see their own.
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
use crate::models::{Notification, UserRef};
use crate::state::AppState;
use crate::store::{Filter, Repo};

use super::{merge_patch, stamp_updated};

#[derive(Debug, Deserialize)]
pub struct CreateNotificationBody {
    #[serde(rename = "userID")]
    pub user_id: Option<Uuid>,
    pub title: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateNotificationBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
}

pub async fn create_notification(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidJson(body): ValidJson<CreateNotificationBody>,
) -> Result<(StatusCode, Json<Notification>), ApiError> {
    let title = body
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request("Notification title is required"))?;
    let message = body
        .message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::bad_request("Notification message is required"))?;

    // Only an admin may address someone else; for everyone else any supplied
    // userID is ignored and the notification lands in their own feed.
    let recipient = match body.user_id {
        Some(target) if target != user.id => {
            guards::ensure_admin(&user)?;
            UserRef(target).resolve(state.store.as_ref()).await?;
            target
        }
        _ => user.id,
    };

    let now = Utc::now();
    let notification = Notification {
        id: Uuid::new_v4(),
        user_id: recipient,
        title,
        message,
        read: false,
        created_at: now,
        updated_at: now,
    };

    Repo::<Notification>::new(state.store.as_ref())
        .insert(&notification)
        .await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let filter = if user.role.is_admin() {
        Filter::new()
    } else {
        Filter::new().eq("userID", user.id)
    };
    let notifications = Repo::<Notification>::new(state.store.as_ref())
        .list(&filter)
        .await?;
    Ok(Json(notifications))
}

pub async fn get_notification(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidId(id): ValidId,
) -> Result<Json<Notification>, ApiError> {
    let notification = find_notification(&state, id).await?;
    guards::ensure_owner_or_admin(&user, notification.user_id, "notification")?;
    Ok(Json(notification))
}

pub async fn update_notification(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidId(id): ValidId,
    ValidJson(body): ValidJson<UpdateNotificationBody>,
) -> Result<Json<Notification>, ApiError> {
    let notification = find_notification(&state, id).await?;
    guards::ensure_owner_or_admin(&user, notification.user_id, "notification")?;

    let mut patch = merge_patch(&body)?;
    stamp_updated(&mut patch);

    let updated = Repo::<Notification>::new(state.store.as_ref())
        .update_merge(id, Value::Object(patch))
        .await?
        .ok_or_else(|| ApiError::not_found("Notification not found"))?;
    Ok(Json(updated))
}

/// `PUT /notifications/:id/read`: flips the read flag without requiring the
/// client to echo the rest of the document back.
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidId(id): ValidId,
) -> Result<Json<Notification>, ApiError> {
    let notification = find_notification(&state, id).await?;
    guards::ensure_owner_or_admin(&user, notification.user_id, "notification")?;

    let updated = Repo::<Notification>::new(state.store.as_ref())
        .update_merge(id, json!({"read": true, "updatedAt": Utc::now()}))
        .await?
        .ok_or_else(|| ApiError::not_found("Notification not found"))?;
    Ok(Json(updated))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidId(id): ValidId,
) -> Result<Json<Value>, ApiError> {
    let notification = find_notification(&state, id).await?;
    guards::ensure_owner_or_admin(&user, notification.user_id, "notification")?;

    Repo::<Notification>::new(state.store.as_ref())
        .delete(id)
        .await?;
    Ok(Json(json!({"message": "Notification deleted"})))
}

async fn find_notification(state: &AppState, id: Uuid) -> Result<Notification, ApiError> {
    Repo::<Notification>::new(state.store.as_ref())
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Notification not found"))
}
