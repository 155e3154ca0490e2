// Settings CRUD. A setting is either global (no userID) or scoped to one
// user. Global entries are readable by everyone and mutable by admins only.
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
use crate::models::Setting;
use crate::state::AppState;
use crate::store::{Filter, Repo};

use super::{merge_patch, stamp_updated};

#[derive(Debug, Deserialize)]
pub struct CreateSettingBody {
    pub key: Option<String>,
    pub value: Option<Value>,
    #[serde(rename = "userID")]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateSettingBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

pub async fn create_setting(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidJson(body): ValidJson<CreateSettingBody>,
) -> Result<(StatusCode, Json<Setting>), ApiError> {
    let key = body
        .key
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ApiError::bad_request("Setting key is required"))?;
    let value = body
        .value
        .ok_or_else(|| ApiError::bad_request("Setting value is required"))?;

    // Admins choose the scope (a user, or global when userID is omitted).
    // Everyone else gets a setting scoped to themselves, whatever they sent.
    let scope = if user.role.is_admin() {
        body.user_id
    } else {
        Some(user.id)
    };

    let now = Utc::now();
    let setting = Setting {
        id: Uuid::new_v4(),
        key,
        value,
        user_id: scope,
        created_at: now,
        updated_at: now,
    };

    Repo::<Setting>::new(state.store.as_ref())
        .insert(&setting)
        .await?;
    Ok((StatusCode::CREATED, Json(setting)))
}

pub async fn list_settings(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<Setting>>, ApiError> {
    let repo = Repo::<Setting>::new(state.store.as_ref());
    if user.role.is_admin() {
        return Ok(Json(repo.list(&Filter::new()).await?));
    }

    // Non-admins see their own settings plus the global ones.
    let mut settings = repo.list(&Filter::new().eq("userID", user.id)).await?;
    let global = repo
        .list(&Filter::new().eq("userID", Option::<Uuid>::None))
        .await?;
    settings.extend(global);
    Ok(Json(settings))
}

pub async fn get_setting(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidId(id): ValidId,
) -> Result<Json<Setting>, ApiError> {
    let setting = find_setting(&state, id).await?;
    if let Some(owner) = setting.user_id {
        guards::ensure_owner_or_admin(&user, owner, "setting")?;
    }
    Ok(Json(setting))
}

pub async fn update_setting(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidId(id): ValidId,
    ValidJson(body): ValidJson<UpdateSettingBody>,
) -> Result<Json<Setting>, ApiError> {
    let setting = find_setting(&state, id).await?;
    ensure_mutable(&user, &setting)?;

    if let Some(key) = &body.key {
        if key.trim().is_empty() {
            return Err(ApiError::bad_request("Setting key is required"));
        }
    }

    let mut patch = merge_patch(&body)?;
    stamp_updated(&mut patch);

    let updated = Repo::<Setting>::new(state.store.as_ref())
        .update_merge(id, Value::Object(patch))
        .await?
        .ok_or_else(|| ApiError::not_found("Setting not found"))?;
    Ok(Json(updated))
}

pub async fn delete_setting(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidId(id): ValidId,
) -> Result<Json<Value>, ApiError> {
    let setting = find_setting(&state, id).await?;
    ensure_mutable(&user, &setting)?;

    Repo::<Setting>::new(state.store.as_ref())
        .delete(id)
        .await?;
    Ok(Json(json!({"message": "Setting deleted"})))
}

fn ensure_mutable(user: &CurrentUser, setting: &Setting) -> Result<(), ApiError> {
    match setting.user_id {
        None => guards::ensure_admin(user),
        Some(owner) => guards::ensure_owner_or_admin(user, owner, "setting"),
    }
}

async fn find_setting(state: &AppState, id: Uuid) -> Result<Setting, ApiError> {
    Repo::<Setting>::new(state.store.as_ref())
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Setting not found"))
}
