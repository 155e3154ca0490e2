use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{collections, Entity};

/// Administrative action trail entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: Uuid,
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    pub action: String,
    pub entity_type: Option<String>,
    #[serde(rename = "entityID")]
    pub entity_id: Option<Uuid>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for AuditLog {
    const COLLECTION: &'static str = collections::AUDIT_LOGS;

    fn id(&self) -> Uuid {
        self.id
    }
}
