use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{collections, Entity};

/// Free-text note attached to any entity by type name and id. The reference
/// is deliberately unchecked; comments may outlive what they point at.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub entity_type: String,
    #[serde(rename = "entityID")]
    pub entity_id: Uuid,
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Comment {
    const COLLECTION: &'static str = collections::COMMENTS;

    fn id(&self) -> Uuid {
        self.id
    }
}
