use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::store::{collections, Entity};

/// Key/value setting. `userID` is null for global settings; the null is
/// serialized explicitly so global entries stay addressable by filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: Uuid,
    pub key: String,
    pub value: Value,
    #[serde(rename = "userID")]
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Setting {
    pub fn is_global(&self) -> bool {
        self.user_id.is_none()
    }
}

impl Entity for Setting {
    const COLLECTION: &'static str = collections::SETTINGS;

    fn id(&self) -> Uuid {
        self.id
    }
}
