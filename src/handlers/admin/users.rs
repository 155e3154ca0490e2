// Full user management. Unlike the agents surface, this one can touch any
// account, including managers and other admins.
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::auth::password;
use crate::error::ApiError;
use crate::extract::{ValidId, ValidJson};
use crate::handlers::stamp_updated;
use crate::middleware::CurrentUser;
use crate::models::{NameInput, PublicUser, Role, User, UserRef};
use crate::services::{accounts, audit};
use crate::state::AppState;
use crate::store::{Filter, Repo};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserBody {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserBody {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    ValidJson(body): ValidJson<CreateUserBody>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    let name = NameInput::from_fields(body.name, body.first_name, body.last_name).normalize("User");
    let role = Role::parse_lenient(body.role.as_deref());

    let user = accounts::create_user(
        state.store.as_ref(),
        name,
        body.email.as_deref(),
        body.password.as_deref(),
        role,
    )
    .await?;

    audit::record(
        state.store.as_ref(),
        admin.id,
        "user.created",
        "user",
        Some(user.id),
        Some(format!("created {} account {}", user.role, user.email)),
    )
    .await;

    Ok((StatusCode::CREATED, Json(PublicUser::from(&user))))
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = Repo::<User>::new(state.store.as_ref())
        .list(&Filter::new())
        .await?;
    Ok(Json(users.iter().map(PublicUser::from).collect()))
}

pub async fn get_user(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> Result<Json<PublicUser>, ApiError> {
    let user = UserRef(id).resolve(state.store.as_ref()).await?;
    Ok(Json(PublicUser::from(&user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    ValidId(id): ValidId,
    ValidJson(body): ValidJson<UpdateUserBody>,
) -> Result<Json<PublicUser>, ApiError> {
    let target = UserRef(id).resolve(state.store.as_ref()).await?;
    let patch = build_user_patch(&state, &target, body).await?;

    let updated = Repo::<User>::new(state.store.as_ref())
        .update_merge(id, Value::Object(patch))
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    audit::record(
        state.store.as_ref(),
        admin.id,
        "user.updated",
        "user",
        Some(id),
        None,
    )
    .await;

    Ok(Json(PublicUser::from(&updated)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    ValidId(id): ValidId,
) -> Result<Json<Value>, ApiError> {
    if id == admin.id {
        return Err(ApiError::forbidden("You cannot delete your own account"));
    }
    let target = UserRef(id).resolve(state.store.as_ref()).await?;

    Repo::<User>::new(state.store.as_ref()).delete(id).await?;

    audit::record(
        state.store.as_ref(),
        admin.id,
        "user.deleted",
        "user",
        Some(id),
        Some(format!("deleted account {}", target.email)),
    )
    .await;

    Ok(Json(json!({"message": "User deleted"})))
}

/// Builds the merge patch for a user update; the agents surface reuses it.
/// Name handling mirrors registration: explicit first/last parts win, and a
/// bare `name` string goes through the same split.
pub(super) async fn build_user_patch(
    state: &AppState,
    target: &User,
    body: UpdateUserBody,
) -> Result<Map<String, Value>, ApiError> {
    let mut patch = Map::new();

    let first = body.first_name.filter(|s| !s.trim().is_empty());
    let last = body.last_name.filter(|s| !s.trim().is_empty());
    if first.is_some() || last.is_some() {
        // Partial name update; the half that was not sent keeps its value.
        if let Some(first) = first {
            patch.insert("firstName".to_string(), json!(first.trim()));
        }
        if let Some(last) = last {
            patch.insert("lastName".to_string(), json!(last.trim()));
        }
    } else if let Some(full) = body.name.filter(|s| !s.trim().is_empty()) {
        let name = NameInput::Full(full).normalize("User");
        patch.insert("firstName".to_string(), json!(name.first_name));
        patch.insert("lastName".to_string(), json!(name.last_name));
    }

    if let Some(email) = body.email.as_deref() {
        let email = email.trim();
        if !accounts::valid_email(email) {
            return Err(ApiError::bad_request("A valid email address is required"));
        }
        let normalized = email.to_lowercase();
        if let Some(other) = accounts::find_by_email(state.store.as_ref(), &normalized).await? {
            if other.id != target.id {
                return Err(ApiError::conflict("A user with this email already exists"));
            }
        }
        patch.insert("email".to_string(), json!(normalized));
    }

    if let Some(new_password) = body.password {
        if new_password.chars().count() < accounts::MIN_PASSWORD_CHARS {
            return Err(ApiError::bad_request(
                "Password must be at least 6 characters",
            ));
        }
        patch.insert(
            "password".to_string(),
            json!(password::hash(new_password).await?),
        );
    }

    if let Some(role) = body.role.as_deref() {
        patch.insert("role".to_string(), json!(Role::parse_lenient(Some(role))));
    }

    stamp_updated(&mut patch);
    Ok(patch)
}
