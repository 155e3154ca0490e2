// Account endpoints: registration, login, and the caller's own profile.
use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::{self, password, Claims};
use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::middleware::CurrentUser;
use crate::models::{NameInput, PublicUser, Role, User, UserRef};
use crate::services::accounts;
use crate::state::AppState;
use crate::store::Repo;

use super::{merge_patch, stamp_updated};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

fn issue_token(user: &User) -> Result<String, ApiError> {
    auth::generate_token(&Claims::new(user)).map_err(|err| ApiError::internal(err.to_string()))
}

fn session_body(token: String, user: &User) -> Json<Value> {
    Json(json!({
        "token": token,
        "user": PublicUser::from(user),
    }))
}

/// Self-service registration. Always creates an agent; roles are granted
/// through the admin surface, never claimed at signup.
pub async fn register(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<RegisterBody>,
) -> Result<Json<Value>, ApiError> {
    let name = NameInput::from_fields(body.name, body.first_name, body.last_name).normalize("User");
    let user = accounts::create_user(
        state.store.as_ref(),
        name,
        body.email.as_deref(),
        body.password.as_deref(),
        Role::Agent,
    )
    .await?;

    let token = issue_token(&user)?;
    Ok(session_body(token, &user))
}

/// Login. Unknown email and wrong password answer the same message, so the
/// response never confirms whether an address is registered.
pub async fn login(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<LoginBody>,
) -> Result<Json<Value>, ApiError> {
    let invalid = || ApiError::bad_request("Invalid credentials");

    let email = body
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(invalid)?;
    let password_input = body.password.filter(|p| !p.is_empty()).ok_or_else(invalid)?;

    let user = accounts::find_by_email(state.store.as_ref(), email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify(password_input, user.password.clone()).await? {
        return Err(invalid());
    }

    let token = issue_token(&user)?;
    Ok(session_body(token, &user))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<PublicUser>, ApiError> {
    let record = UserRef(user.id).resolve(state.store.as_ref()).await?;
    Ok(Json(PublicUser::from(&record)))
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidJson(mut body): ValidJson<UpdateProfileBody>,
) -> Result<Json<PublicUser>, ApiError> {
    if let Some(email) = body.email.as_deref() {
        if !accounts::valid_email(email.trim()) {
            return Err(ApiError::bad_request("A valid email address is required"));
        }
        let normalized = email.trim().to_lowercase();
        if let Some(other) = accounts::find_by_email(state.store.as_ref(), &normalized).await? {
            if other.id != user.id {
                return Err(ApiError::conflict("A user with this email already exists"));
            }
        }
        body.email = Some(normalized);
    }

    let mut patch = merge_patch(&body)?;
    stamp_updated(&mut patch);

    let updated = Repo::<User>::new(state.store.as_ref())
        .update_merge(user.id, Value::Object(patch))
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(PublicUser::from(&updated)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordBody {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidJson(body): ValidJson<ChangePasswordBody>,
) -> Result<Json<Value>, ApiError> {
    let record = UserRef(user.id).resolve(state.store.as_ref()).await?;

    let current = body.current_password.unwrap_or_default();
    if !password::verify(current, record.password.clone()).await? {
        return Err(ApiError::bad_request("Current password is incorrect"));
    }

    let next = body
        .new_password
        .filter(|p| p.chars().count() >= accounts::MIN_PASSWORD_CHARS)
        .ok_or_else(|| ApiError::bad_request("Password must be at least 6 characters"))?;

    let mut patch = serde_json::Map::new();
    patch.insert("password".to_string(), json!(password::hash(next).await?));
    stamp_updated(&mut patch);

    Repo::<User>::new(state.store.as_ref())
        .update_merge(user.id, Value::Object(patch))
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(json!({"message": "Password updated"})))
}
