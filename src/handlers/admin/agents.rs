// Agent management surface. Same storage as users, narrowed to the agent
// role; admin accounts are off limits here and must go through /admin/users.
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::{ValidId, ValidJson};
use crate::middleware::CurrentUser;
use crate::models::{NameInput, PublicUser, Role, User};
use crate::services::{accounts, audit, dashboard::DashboardService};
use crate::state::AppState;
use crate::store::{Filter, Repo};

use super::users::{build_user_patch, UpdateUserBody};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgentBody {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn create_agent(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    ValidJson(body): ValidJson<CreateAgentBody>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    let name =
        NameInput::from_fields(body.name, body.first_name, body.last_name).normalize("Agent");

    // This surface only ever mints agents; there is no role field to honor.
    let agent = accounts::create_user(
        state.store.as_ref(),
        name,
        body.email.as_deref(),
        body.password.as_deref(),
        Role::Agent,
    )
    .await?;

    audit::record(
        state.store.as_ref(),
        admin.id,
        "agent.created",
        "user",
        Some(agent.id),
        Some(format!("created agent account {}", agent.email)),
    )
    .await;

    Ok((StatusCode::CREATED, Json(PublicUser::from(&agent))))
}

pub async fn list_agents(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let agents = Repo::<User>::new(state.store.as_ref())
        .list(&Filter::new().eq("role", Role::Agent))
        .await?;
    Ok(Json(agents.iter().map(PublicUser::from).collect()))
}

pub async fn get_agent(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> Result<Json<PublicUser>, ApiError> {
    let agent = find_agent(&state, id).await?;
    Ok(Json(PublicUser::from(&agent)))
}

pub async fn update_agent(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    ValidId(id): ValidId,
    ValidJson(body): ValidJson<UpdateUserBody>,
) -> Result<Json<PublicUser>, ApiError> {
    let target = find_agent(&state, id).await?;
    ensure_not_admin(&target)?;

    let patch = build_user_patch(&state, &target, body).await?;
    let updated = Repo::<User>::new(state.store.as_ref())
        .update_merge(id, Value::Object(patch))
        .await?
        .ok_or_else(|| ApiError::not_found("Agent not found"))?;

    audit::record(
        state.store.as_ref(),
        admin.id,
        "agent.updated",
        "user",
        Some(id),
        None,
    )
    .await;

    Ok(Json(PublicUser::from(&updated)))
}

pub async fn delete_agent(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    ValidId(id): ValidId,
) -> Result<Json<Value>, ApiError> {
    let target = find_agent(&state, id).await?;
    // Covers self-deletion too: the caller here is always an admin.
    ensure_not_admin(&target)?;

    Repo::<User>::new(state.store.as_ref()).delete(id).await?;

    audit::record(
        state.store.as_ref(),
        admin.id,
        "agent.deleted",
        "user",
        Some(id),
        Some(format!("deleted agent account {}", target.email)),
    )
    .await;

    Ok(Json(json!({"message": "Agent deleted"})))
}

/// `GET /admin/agents/:id/stats`: lifetime counters for one agent.
pub async fn agent_stats(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> Result<Json<Value>, ApiError> {
    let agent = find_agent(&state, id).await?;
    let stats = DashboardService::new(state.store.as_ref())
        .agent_stats(agent.id)
        .await?;
    Ok(Json(json!({
        "agent": PublicUser::from(&agent),
        "stats": stats,
    })))
}

fn ensure_not_admin(target: &User) -> Result<(), ApiError> {
    if target.role.is_admin() {
        return Err(ApiError::forbidden("Admin accounts cannot be managed here"));
    }
    Ok(())
}

async fn find_agent(state: &AppState, id: Uuid) -> Result<User, ApiError> {
    Repo::<User>::new(state.store.as_ref())
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Agent not found"))
}
