use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use uuid::Uuid;

use super::{DocumentStore, Filter, StoreError};

/// A record type stored as documents of one fixed collection.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;
}

/// Typed view over one collection. Decode failures surface as store errors
/// rather than panics so a hand-edited document cannot take a request down.
pub struct Repo<'a, T> {
    store: &'a dyn DocumentStore,
    _entity: PhantomData<T>,
}

impl<'a, T: Entity> Repo<'a, T> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    fn encode(entity: &T) -> Result<Value, StoreError> {
        serde_json::to_value(entity).map_err(|err| StoreError::Serialization(err.to_string()))
    }

    fn decode(doc: Value) -> Result<T, StoreError> {
        serde_json::from_value(doc).map_err(|err| StoreError::Serialization(err.to_string()))
    }

    pub async fn insert(&self, entity: &T) -> Result<(), StoreError> {
        self.store
            .insert(T::COLLECTION, entity.id(), Self::encode(entity)?)
            .await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        match self.store.get(T::COLLECTION, id).await? {
            Some(doc) => Ok(Some(Self::decode(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn list(&self, filter: &Filter) -> Result<Vec<T>, StoreError> {
        self.store
            .list(T::COLLECTION, filter)
            .await?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    pub async fn update_merge(&self, id: Uuid, patch: Value) -> Result<Option<T>, StoreError> {
        match self.store.update_merge(T::COLLECTION, id, patch).await? {
            Some(doc) => Ok(Some(Self::decode(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.store.delete(T::COLLECTION, id).await
    }

    pub async fn count(&self, filter: &Filter) -> Result<i64, StoreError> {
        self.store.count(T::COLLECTION, filter).await
    }
}
