// src/store/memory.rs

//! In-process entity store used by the unit tests.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EntityKind, EntityStore, Order, Record, StoreError, stamp, strip_system_fields};

#[derive(Debug, Clone)]
struct Row {
    id: Uuid,
    data: Record,
    created_date: DateTime<Utc>,
    updated_date: DateTime<Utc>,
}

impl Row {
    fn to_value(&self) -> Value {
        let mut map = self.data.clone();
        map.insert("id".into(), Value::String(self.id.to_string()));
        map.insert("created_date".into(), Value::String(stamp(self.created_date)));
        map.insert("updated_date".into(), Value::String(stamp(self.updated_date)));
        Value::Object(map)
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::String(self.id.to_string())),
            "created_date" => Some(Value::String(stamp(self.created_date))),
            "updated_date" => Some(Value::String(stamp(self.updated_date))),
            _ => self.data.get(name).cloned(),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<HashMap<EntityKind, Vec<Row>>>,
    clock: RwLock<Option<DateTime<Utc>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strictly increasing timestamps so `created_date` ordering is stable.
    async fn tick(&self) -> DateTime<Utc> {
        let mut last = self.clock.write().await;
        let now = match *last {
            Some(prev) if Utc::now() <= prev => prev + Duration::microseconds(1),
            _ => Utc::now(),
        };
        *last = Some(now);
        now
    }

    async fn select(&self, kind: EntityKind, fields: Option<&Record>, order: Option<&Order>) -> Vec<Value> {
        let rows = self.rows.read().await;
        let mut hits: Vec<&Row> = rows
            .get(&kind)
            .map(|v| v.iter().collect())
            .unwrap_or_default();

        if let Some(fields) = fields {
            hits.retain(|row| fields.iter().all(|(k, v)| row.data.get(k) == Some(v)));
        }

        if let Some(order) = order {
            hits.sort_by(|a, b| {
                let ord = compare_json(a.field(&order.field).as_ref(), b.field(&order.field).as_ref());
                if order.descending { ord.reverse() } else { ord }
            });
        }

        hits.into_iter().map(Row::to_value).collect()
    }
}

/// Missing and null sort last; mixed types sort by type rank.
fn compare_json(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            Some(Value::Number(_)) => 0,
            Some(Value::String(_)) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Array(_)) | Some(Value::Object(_)) => 3,
            Some(Value::Null) | None => 4,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn list(&self, kind: EntityKind, order: Option<&Order>) -> Result<Vec<Value>, StoreError> {
        Ok(self.select(kind, None, order).await)
    }

    async fn filter(
        &self,
        kind: EntityKind,
        fields: &Record,
        order: Option<&Order>,
    ) -> Result<Vec<Value>, StoreError> {
        Ok(self.select(kind, Some(fields), order).await)
    }

    async fn get(&self, kind: EntityKind, id: Uuid) -> Result<Option<Value>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows
            .get(&kind)
            .and_then(|v| v.iter().find(|r| r.id == id))
            .map(Row::to_value))
    }

    async fn create(&self, kind: EntityKind, record: Record) -> Result<Value, StoreError> {
        let now = self.tick().await;
        let row = Row {
            id: Uuid::new_v4(),
            data: strip_system_fields(record),
            created_date: now,
            updated_date: now,
        };
        let value = row.to_value();
        self.rows.write().await.entry(kind).or_default().push(row);
        Ok(value)
    }

    async fn update(&self, kind: EntityKind, id: Uuid, patch: Record) -> Result<Value, StoreError> {
        let now = self.tick().await;
        let mut rows = self.rows.write().await;
        let row = rows
            .get_mut(&kind)
            .and_then(|v| v.iter_mut().find(|r| r.id == id))
            .ok_or(StoreError::NotFound { kind, id })?;

        for (key, value) in strip_system_fields(patch) {
            row.data.insert(key, value);
        }
        row.updated_date = now;
        Ok(row.to_value())
    }

    async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        let bucket = rows.entry(kind).or_default();
        let before = bucket.len();
        bucket.retain(|r| r.id != id);
        if bucket.len() == before {
            return Err(StoreError::NotFound { kind, id });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_timestamps() {
        let store = MemoryStore::new();
        let created = store
            .create(EntityKind::QuickReply, record(json!({ "titulo": "Oi", "id": "ignored" })))
            .await
            .unwrap();

        assert!(Uuid::parse_str(created["id"].as_str().unwrap()).is_ok());
        assert!(created.get("created_date").is_some());
        assert_eq!(created["titulo"], "Oi");
    }

    #[tokio::test]
    async fn list_orders_by_field_name() {
        let store = MemoryStore::new();
        for name in ["Carla", "Ana", "Bruno"] {
            store
                .create(EntityKind::Patient, record(json!({ "nome_completo": name })))
                .await
                .unwrap();
        }

        let asc = store
            .list(EntityKind::Patient, Some(&Order::parse("nome_completo")))
            .await
            .unwrap();
        let names: Vec<&str> = asc.iter().map(|v| v["nome_completo"].as_str().unwrap()).collect();
        assert_eq!(names, ["Ana", "Bruno", "Carla"]);

        let newest_first = store
            .list(EntityKind::Patient, Some(&Order::parse("-created_date")))
            .await
            .unwrap();
        assert_eq!(newest_first[0]["nome_completo"], "Bruno");
    }

    #[tokio::test]
    async fn filter_matches_all_fields() {
        let store = MemoryStore::new();
        store
            .create(EntityKind::Conversation, record(json!({ "status": "aguardando", "canal": "email" })))
            .await
            .unwrap();
        store
            .create(EntityKind::Conversation, record(json!({ "status": "resolvido", "canal": "email" })))
            .await
            .unwrap();

        let waiting = store
            .filter(EntityKind::Conversation, &record(json!({ "status": "aguardando" })), None)
            .await
            .unwrap();
        assert_eq!(waiting.len(), 1);
    }

    #[tokio::test]
    async fn update_merges_and_delete_removes() {
        let store = MemoryStore::new();
        let created = store
            .create(EntityKind::Conversation, record(json!({ "status": "aguardando", "assunto": "Exame" })))
            .await
            .unwrap();
        let id = Uuid::parse_str(created["id"].as_str().unwrap()).unwrap();

        let updated = store
            .update(EntityKind::Conversation, id, record(json!({ "status": "resolvido" })))
            .await
            .unwrap();
        assert_eq!(updated["status"], "resolvido");
        assert_eq!(updated["assunto"], "Exame");

        store.delete(EntityKind::Conversation, id).await.unwrap();
        assert!(store.get(EntityKind::Conversation, id).await.unwrap().is_none());
        assert!(matches!(
            store.delete(EntityKind::Conversation, id).await,
            Err(StoreError::NotFound { .. })
        ));
    }
}
