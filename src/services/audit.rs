use chrono::Utc;
use uuid::Uuid;

use crate::config;
use crate::models::AuditLog;
use crate::store::{DocumentStore, Repo};

/// Best-effort audit trail write for admin actions. A no-op when audit
/// logging is disabled; a failed write logs a warning without failing the
/// action it records.
pub async fn record(
    store: &dyn DocumentStore,
    actor: Uuid,
    action: &str,
    entity_type: &str,
    entity_id: Option<Uuid>,
    details: Option<String>,
) {
    if !config::config().security.enable_audit_logging {
        return;
    }

    let now = Utc::now();
    let entry = AuditLog {
        id: Uuid::new_v4(),
        user_id: actor,
        action: action.to_string(),
        entity_type: Some(entity_type.to_string()),
        entity_id,
        details,
        created_at: now,
        updated_at: now,
    };

    if let Err(err) = Repo::<AuditLog>::new(store).insert(&entry).await {
        tracing::warn!(action, "audit trail write failed: {}", err);
    }
}
