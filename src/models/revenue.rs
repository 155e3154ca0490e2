use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{collections, Entity};

/// Reporting-oriented revenue record derived from a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revenue {
    pub id: Uuid,
    #[serde(rename = "saleID")]
    pub sale_id: Uuid,
    pub amount: f64,
    pub source: Option<String>,
    pub category: Option<String>,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Revenue {
    const COLLECTION: &'static str = collections::REVENUES;

    fn id(&self) -> Uuid {
        self.id
    }
}
