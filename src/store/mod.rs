// src/store/mod.rs

//! Generic entity store: collections of JSON records keyed by entity kind.
//!
//! Every screen reads whole collections and filters them in memory, so the
//! contract is deliberately small: list, filter by field equality, get,
//! create, shallow-merge update and delete.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

#[cfg(test)]
pub mod memory;
pub mod pg;
pub mod typed;

pub use pg::PgEntityStore;
pub use typed::{Collection, Entity, Stored};

/// A record body: top-level JSON object.
pub type Record = Map<String, Value>;

/// Fields the store owns on every record; never written from a body.
pub const SYSTEM_FIELDS: [&str; 3] = ["id", "created_date", "updated_date"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Appointment,
    Patient,
    Conversation,
    Message,
    QuickReply,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Appointment => "Appointment",
            EntityKind::Patient => "Patient",
            EntityKind::Conversation => "Conversation",
            EntityKind::Message => "Message",
            EntityKind::QuickReply => "QuickReply",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort key by field name; a leading `-` means descending (`-created_date`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    pub descending: bool,
}

impl Order {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.strip_prefix('-') {
            Some(field) => Order {
                field: field.to_string(),
                descending: true,
            },
            None => Order {
                field: raw.to_string(),
                descending: false,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: Uuid },

    #[error("{kind} body must be a JSON object")]
    NotAnObject { kind: EntityKind },

    #[error("record decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("db error: {0}")]
    Db(#[from] sqlx::Error),
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn list(&self, kind: EntityKind, order: Option<&Order>) -> Result<Vec<Value>, StoreError>;

    /// Records whose top-level fields equal every entry of `fields`.
    async fn filter(
        &self,
        kind: EntityKind,
        fields: &Record,
        order: Option<&Order>,
    ) -> Result<Vec<Value>, StoreError>;

    async fn get(&self, kind: EntityKind, id: Uuid) -> Result<Option<Value>, StoreError>;

    async fn create(&self, kind: EntityKind, record: Record) -> Result<Value, StoreError>;

    /// Shallow merge: top-level keys of `patch` replace the stored ones.
    async fn update(&self, kind: EntityKind, id: Uuid, patch: Record) -> Result<Value, StoreError>;

    async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<(), StoreError>;
}

/// Fixed-width RFC 3339 so timestamps also sort as strings.
pub(crate) fn stamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Drop store-owned keys from a client body.
pub(crate) fn strip_system_fields(mut record: Record) -> Record {
    for key in SYSTEM_FIELDS {
        record.remove(key);
    }
    record
}
