use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth;
use crate::error::ApiError;
use crate::models::{Role, User, UserRef};
use crate::state::AppState;

/// Authenticated caller context injected into request extensions
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.display_name(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Access-token middleware. Verifies the token, resolves the account fresh
/// from the store (a stale role claim never outlives the stored record), and
/// injects [`CurrentUser`] for handlers and role guards downstream.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers())
        .ok_or_else(|| ApiError::unauthenticated("Authentication required"))?;

    // One message for malformed, expired, and mis-signed tokens.
    let claims = auth::verify_token(&token)
        .map_err(|_| ApiError::unauthenticated("Invalid or expired token"))?;

    // A token whose subject no longer exists reads as a bad token, not a 404.
    let user = match UserRef(claims.sub).resolve(state.store.as_ref()).await {
        Ok(user) => user,
        Err(ApiError::NotFound(_)) => {
            return Err(ApiError::unauthenticated("Invalid or expired token"))
        }
        Err(other) => return Err(other),
    };

    request.extensions_mut().insert(CurrentUser::from(&user));
    Ok(next.run(request).await)
}

/// Extract the access token from the Authorization header. Accepts both
/// `Bearer <token>` and a raw token value.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("authorization")?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
