// Resource handlers, one module per collection plus the admin surfaces.
//
// Shared contract: creates answer 201 with the stored record, lookups that
// miss answer 404 before any ownership 403, partial updates merge only the
// fields the client sent, and deletes answer a `message` body.
pub mod admin;
pub mod audit_logs;
pub mod comments;
pub mod customers;
pub mod dashboard;
pub mod notifications;
pub mod payments;
pub mod performances;
pub mod revenues;
pub mod sales;
pub mod settings;
pub mod targets;
pub mod users;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Serialize a partial-update DTO into a merge patch. Omitted fields are
/// skipped entirely, so they survive the merge untouched.
pub(crate) fn merge_patch<T: Serialize>(dto: &T) -> Result<Map<String, Value>, ApiError> {
    match serde_json::to_value(dto) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::internal("patch must serialize to an object")),
        Err(err) => Err(ApiError::internal(err.to_string())),
    }
}

/// Every successful mutation refreshes `updatedAt`.
pub(crate) fn stamp_updated(patch: &mut Map<String, Value>) {
    patch.insert(
        "updatedAt".to_string(),
        serde_json::json!(chrono::Utc::now()),
    );
}
