// Role guards
//
// Pure checks over the already-authenticated caller; no storage access
// happens here. The `ensure_*` predicates are the single source of truth,
// used both as route-group middleware and inline where a path mixes methods
// with different role requirements.
use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::Role;

use super::auth::CurrentUser;

pub fn ensure_admin(user: &CurrentUser) -> Result<(), ApiError> {
    if user.role.is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Admin access required"))
    }
}

pub fn ensure_manager_or_admin(user: &CurrentUser) -> Result<(), ApiError> {
    match user.role {
        Role::Manager | Role::Admin => Ok(()),
        Role::Agent => Err(ApiError::forbidden("Manager access required")),
    }
}

pub fn ensure_agent_or_admin(user: &CurrentUser) -> Result<(), ApiError> {
    match user.role {
        Role::Agent | Role::Admin => Ok(()),
        Role::Manager => Err(ApiError::forbidden("Agent access required")),
    }
}

/// Ownership check for records that carry an owning user id. Handlers call
/// this after the lookup, so a missing record answers 404 before any 403.
pub fn ensure_owner_or_admin(
    user: &CurrentUser,
    owner: Uuid,
    noun: &str,
) -> Result<(), ApiError> {
    if user.role.is_admin() || user.id == owner {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "Not authorized to access this {noun}"
        )))
    }
}

fn current_user(request: &Request) -> Result<&CurrentUser, ApiError> {
    // Absent context means the authentication layer never ran on this route.
    request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ApiError::unauthenticated("Authentication required"))
}

pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    ensure_admin(current_user(&request)?)?;
    Ok(next.run(request).await)
}

pub async fn require_manager_or_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    ensure_manager_or_admin(current_user(&request)?)?;
    Ok(next.run(request).await)
}

pub async fn require_agent_or_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    ensure_agent_or_admin(current_user(&request)?)?;
    Ok(next.run(request).await)
}
