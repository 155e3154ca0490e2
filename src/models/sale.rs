use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{collections, Entity};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

/// Sale record. Both reference fields are immutable after creation; `agentID`
/// is stamped from the authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    #[serde(rename = "customerID")]
    pub customer_id: Uuid,
    #[serde(rename = "agentID")]
    pub agent_id: Uuid,
    pub amount: f64,
    pub status: SaleStatus,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Sale {
    const COLLECTION: &'static str = collections::SALES;

    fn id(&self) -> Uuid {
        self.id
    }
}
