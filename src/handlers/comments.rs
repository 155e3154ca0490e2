// Comment CRUD. Comments attach to any entity by type and id; edits and
// deletes are author-or-admin.
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::{ValidId, ValidJson};
use crate::middleware::{guards, CurrentUser};
use crate::models::Comment;
use crate::state::AppState;
use crate::store::{Filter, Repo};

use super::{merge_patch, stamp_updated};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentBody {
    pub entity_type: Option<String>,
    #[serde(rename = "entityID")]
    pub entity_id: Option<Uuid>,
    pub body: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateCommentBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentQuery {
    pub entity_type: Option<String>,
    #[serde(rename = "entityID")]
    pub entity_id: Option<Uuid>,
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidJson(body): ValidJson<CreateCommentBody>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let entity_type = body
        .entity_type
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request("entityType is required"))?;
    let entity_id = body
        .entity_id
        .ok_or_else(|| ApiError::bad_request("entityID is required"))?;
    let text = body
        .body
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .ok_or_else(|| ApiError::bad_request("Comment body is required"))?;

    let now = Utc::now();
    let comment = Comment {
        id: Uuid::new_v4(),
        entity_type,
        entity_id,
        user_id: user.id,
        body: text,
        created_at: now,
        updated_at: now,
    };

    Repo::<Comment>::new(state.store.as_ref())
        .insert(&comment)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// List comments, optionally narrowed to one entity via query string.
pub async fn list_comments(
    State(state): State<AppState>,
    Query(query): Query<CommentQuery>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let mut filter = Filter::new();
    if let Some(entity_type) = query.entity_type {
        filter = filter.eq("entityType", entity_type);
    }
    if let Some(entity_id) = query.entity_id {
        filter = filter.eq("entityID", entity_id);
    }

    let comments = Repo::<Comment>::new(state.store.as_ref())
        .list(&filter)
        .await?;
    Ok(Json(comments))
}

pub async fn get_comment(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> Result<Json<Comment>, ApiError> {
    Ok(Json(find_comment(&state, id).await?))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidId(id): ValidId,
    ValidJson(body): ValidJson<UpdateCommentBody>,
) -> Result<Json<Comment>, ApiError> {
    let comment = find_comment(&state, id).await?;
    guards::ensure_owner_or_admin(&user, comment.user_id, "comment")?;

    if let Some(text) = body.body.as_deref() {
        if text.trim().is_empty() {
            return Err(ApiError::bad_request("Comment body is required"));
        }
    }

    let mut patch = merge_patch(&body)?;
    stamp_updated(&mut patch);

    let updated = Repo::<Comment>::new(state.store.as_ref())
        .update_merge(id, Value::Object(patch))
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;
    Ok(Json(updated))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidId(id): ValidId,
) -> Result<Json<Value>, ApiError> {
    let comment = find_comment(&state, id).await?;
    guards::ensure_owner_or_admin(&user, comment.user_id, "comment")?;

    Repo::<Comment>::new(state.store.as_ref()).delete(id).await?;
    Ok(Json(json!({"message": "Comment deleted"})))
}

async fn find_comment(state: &AppState, id: Uuid) -> Result<Comment, ApiError> {
    Repo::<Comment>::new(state.store.as_ref())
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))
}
