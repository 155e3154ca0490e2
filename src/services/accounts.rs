// Account creation and bootstrap
//
// Registration, both admin surfaces, and startup bootstrap all funnel
// through `create_user`, so validation and the conflict answer stay
// identical regardless of who creates the account.
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::auth::password;
use crate::error::ApiError;
use crate::models::{NameInput, NormalizedName, Role, User};
use crate::store::{DocumentStore, Filter, Repo};

pub const MIN_PASSWORD_CHARS: usize = 6;

/// Address-shape check: something before the @, a dotted domain after it,
/// no whitespace. Deliverability is not this API's problem.
pub fn valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
}

/// Emails are stored lowercased; lookups normalize the same way.
pub async fn find_by_email(
    store: &dyn DocumentStore,
    email: &str,
) -> Result<Option<User>, ApiError> {
    let users = Repo::<User>::new(store)
        .list(&Filter::new().eq("email", email.trim().to_lowercase()))
        .await?;
    Ok(users.into_iter().next())
}

pub async fn create_user(
    store: &dyn DocumentStore,
    name: NormalizedName,
    email: Option<&str>,
    password_input: Option<&str>,
    role: Role,
) -> Result<User, ApiError> {
    let email = email
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::bad_request("Email is required"))?;
    if !valid_email(email) {
        return Err(ApiError::bad_request("A valid email address is required"));
    }

    let password_input = password_input
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("Password is required"))?;
    if password_input.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ApiError::bad_request(
            "Password must be at least 6 characters",
        ));
    }

    let email = email.to_lowercase();
    if find_by_email(store, &email).await?.is_some() {
        return Err(ApiError::conflict("A user with this email already exists"));
    }

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        first_name: name.first_name,
        last_name: name.last_name,
        email,
        password: password::hash(password_input.to_string()).await?,
        role,
        created_at: now,
        updated_at: now,
    };
    Repo::<User>::new(store).insert(&user).await?;
    Ok(user)
}

/// Idempotent bootstrap of the configured admin account. An existing account
/// under the same email is promoted to admin rather than duplicated.
pub async fn ensure_admin(
    store: &dyn DocumentStore,
    email: &str,
    password_input: &str,
    name: &str,
) -> Result<User, ApiError> {
    let normalized_email = email.trim().to_lowercase();
    if let Some(existing) = find_by_email(store, &normalized_email).await? {
        if existing.role != Role::Admin {
            let patch = json!({"role": Role::Admin, "updatedAt": Utc::now()});
            let promoted = Repo::<User>::new(store)
                .update_merge(existing.id, patch)
                .await?
                .ok_or_else(|| ApiError::internal("admin account vanished during bootstrap"))?;
            tracing::info!(email = %normalized_email, "promoted existing account to admin");
            return Ok(promoted);
        }
        return Ok(existing);
    }

    let name = NameInput::from_fields(Some(name.to_string()), None, None).normalize("Admin");
    let admin = create_user(
        store,
        name,
        Some(&normalized_email),
        Some(password_input),
        Role::Admin,
    )
    .await?;
    tracing::info!(email = %admin.email, "created bootstrap admin account");
    Ok(admin)
}
