// Document store abstraction
//
// Every record lives as a JSON document in a named collection. The store
// offers CRUD plus equality filtering; anything richer (joins, aggregation)
// is done in application code over fetched documents.
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{config, StoreBackend};

pub mod memory;
pub mod postgres;
pub mod repo;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repo::{Entity, Repo};

/// Collection names used across the API.
pub mod collections {
    pub const USERS: &str = "users";
    pub const CUSTOMERS: &str = "customers";
    pub const SALES: &str = "sales";
    pub const PAYMENTS: &str = "payments";
    pub const REVENUES: &str = "revenues";
    pub const TARGETS: &str = "targets";
    pub const PERFORMANCES: &str = "performances";
    pub const COMMENTS: &str = "comments";
    pub const AUDIT_LOGS: &str = "audit_logs";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const SETTINGS: &str = "settings";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Backend(String),

    #[error("stored document is malformed: {0}")]
    Serialization(String),

    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Conjunction of top-level field equality clauses.
///
/// This is the entire query language the store exposes. Ownership scoping
/// builds on it, so filters are applied inside the backend, not after fetch.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.clauses.push((field.into(), value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// True when every clause matches the document's top-level field.
    pub fn matches(&self, doc: &Value) -> bool {
        self.clauses
            .iter()
            .all(|(field, value)| doc.get(field) == Some(value))
    }

    /// JSON object usable with Postgres `@>` containment. Empty filters
    /// yield `{}`, which contains into every document.
    pub fn to_containment(&self) -> Value {
        let mut object = Map::new();
        for (field, value) in &self.clauses {
            object.insert(field.clone(), value.clone());
        }
        Value::Object(object)
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, collection: &str, id: Uuid, doc: Value) -> Result<(), StoreError>;

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Value>, StoreError>;

    /// All matching documents, newest first by `createdAt`.
    async fn list(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>, StoreError>;

    /// Shallow-merges `patch` into the stored document and returns the result.
    /// `None` when no such document exists.
    async fn update_merge(
        &self,
        collection: &str,
        id: Uuid,
        patch: Value,
    ) -> Result<Option<Value>, StoreError>;

    /// True when a document was removed.
    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError>;

    async fn count(&self, collection: &str, filter: &Filter) -> Result<i64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Build the store selected by configuration.
pub async fn init_from_config() -> Result<Arc<dyn DocumentStore>, StoreError> {
    let store_config = &config().store;
    match store_config.backend {
        StoreBackend::Memory => {
            tracing::info!("using in-memory document store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let url = store_config.database_url.as_deref().ok_or_else(|| {
                StoreError::Backend("DATABASE_URL is required for the postgres store".to_string())
            })?;
            let store = PgStore::connect(url, store_config.max_connections).await?;
            store.ensure_schema().await?;
            tracing::info!("connected to postgres document store");
            Ok(Arc::new(store))
        }
    }
}
