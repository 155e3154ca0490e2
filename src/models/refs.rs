use uuid::Uuid;

use crate::error::ApiError;
use crate::store::{DocumentStore, Repo};

use super::{Customer, Sale, User};

/// Checked reference to a user document.
///
/// Reference fields in payloads are plain UUIDs. Resolving one before use is
/// the only integrity check the document store offers, and the distinct types
/// keep a customer id from being passed where a user id belongs. Resolution
/// failure is a 404 naming the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserRef(pub Uuid);

impl UserRef {
    pub async fn resolve(&self, store: &dyn DocumentStore) -> Result<User, ApiError> {
        Repo::<User>::new(store)
            .get(self.0)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerRef(pub Uuid);

impl CustomerRef {
    pub async fn resolve(&self, store: &dyn DocumentStore) -> Result<Customer, ApiError> {
        Repo::<Customer>::new(store)
            .get(self.0)
            .await?
            .ok_or_else(|| ApiError::not_found("Customer not found"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleRef(pub Uuid);

impl SaleRef {
    pub async fn resolve(&self, store: &dyn DocumentStore) -> Result<Sale, ApiError> {
        Repo::<Sale>::new(store)
            .get(self.0)
            .await?
            .ok_or_else(|| ApiError::not_found("Sale not found"))
    }
}
