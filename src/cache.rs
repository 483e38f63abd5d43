// src/cache.rs

//! Keyed read cache in front of the entity store.
//!
//! Entries are whole collection snapshots. Mutations discard every entry
//! under a key prefix; there is no merging, and a fetch that completes after
//! an invalidation simply replaces whatever is cached for its key.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::store::StoreError;

pub const CONVERSATIONS: &str = "conversas";
pub const MESSAGES: &str = "mensagens";
pub const APPOINTMENTS: &str = "appointments";
pub const PATIENTS: &str = "patients";
pub const QUICK_REPLIES: &str = "quickReplies";

pub type Snapshot = Arc<Vec<Value>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new(root: &str) -> Self {
        QueryKey(vec![root.to_string()])
    }

    pub fn with(mut self, part: impl ToString) -> Self {
        self.0.push(part.to_string());
        self
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

#[derive(Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, Snapshot>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_fetch<F, Fut>(&self, key: QueryKey, fetch: F) -> Result<Snapshot, StoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Value>, StoreError>>,
    {
        if let Some(hit) = self.entries.read().await.get(&key).cloned() {
            tracing::debug!(key = ?key, "cache hit");
            return Ok(hit);
        }

        let fresh: Snapshot = Arc::new(fetch().await?);
        self.entries.write().await.insert(key, fresh.clone());
        Ok(fresh)
    }

    /// Drop every entry whose key starts with `prefix`; returns how many.
    pub async fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        let dropped = before - entries.len();
        tracing::debug!(prefix = ?prefix, dropped, "cache invalidated");
        dropped
    }
}
