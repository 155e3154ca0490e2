use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{collections, Entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformancePeriod {
    Daily,
    Weekly,
    Monthly,
}

/// Per-user performance snapshot for one reporting period.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub id: Uuid,
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    pub period: PerformancePeriod,
    pub total_sales: i64,
    pub total_revenue: f64,
    pub conversion_rate: f64,
    pub period_start: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Performance {
    const COLLECTION: &'static str = collections::PERFORMANCES;

    fn id(&self) -> Uuid {
        self.id
    }
}
