// src/store/typed.rs

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use uuid::Uuid;

use super::{EntityKind, EntityStore, Record, StoreError};

/// A record body type bound to one collection.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const KIND: EntityKind;
}

/// A record as returned by the store: body plus store-owned fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<E> {
    pub id: Uuid,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
    #[serde(flatten)]
    pub data: E,
}

impl<E: DeserializeOwned> Stored<E> {
    pub fn decode(value: Value) -> Result<Self, StoreError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Decodes a collection snapshot. Rows that no longer match the body
    /// type are logged and left out.
    pub fn decode_all(values: &[Value]) -> Vec<Self> {
        values
            .iter()
            .filter_map(|value| match Self::decode(value.clone()) {
                Ok(stored) => Some(stored),
                Err(e) => {
                    let id = value.get("id").and_then(Value::as_str).unwrap_or("?");
                    tracing::warn!(record_id = id, error = %e, "skipping undecodable record");
                    None
                }
            })
            .collect()
    }
}

pub(crate) fn to_record<T: Serialize>(kind: EntityKind, body: &T) -> Result<Record, StoreError> {
    match serde_json::to_value(body)? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotAnObject { kind }),
    }
}

/// Typed view over one collection of an [`EntityStore`].
pub struct Collection<'a, E> {
    store: &'a dyn EntityStore,
    _entity: PhantomData<fn() -> E>,
}

impl<'a, E: Entity> Collection<'a, E> {
    pub fn new(store: &'a dyn EntityStore) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<Stored<E>, StoreError> {
        let value = self
            .store
            .get(E::KIND, id)
            .await?
            .ok_or(StoreError::NotFound { kind: E::KIND, id })?;
        Stored::decode(value)
    }

    pub async fn create(&self, body: &E) -> Result<Stored<E>, StoreError> {
        let record = to_record(E::KIND, body)?;
        Stored::decode(self.store.create(E::KIND, record).await?)
    }

    pub async fn update<P: Serialize + Sync>(&self, id: Uuid, patch: &P) -> Result<Stored<E>, StoreError> {
        let patch = to_record(E::KIND, patch)?;
        Stored::decode(self.store.update(E::KIND, id, patch).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.store.delete(E::KIND, id).await
    }
}
