// src/store/pg.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder, types::Json};
use uuid::Uuid;

use super::{
    EntityKind, EntityStore, Order, Record, SYSTEM_FIELDS, StoreError, stamp, strip_system_fields,
};

#[derive(Debug, sqlx::FromRow)]
struct RecordRow {
    id: Uuid,
    data: Json<Record>,
    created_date: DateTime<Utc>,
    updated_date: DateTime<Utc>,
}

impl RecordRow {
    fn into_value(self) -> Value {
        let mut map = self.data.0;
        map.insert("id".into(), Value::String(self.id.to_string()));
        map.insert(
            "created_date".into(),
            Value::String(stamp(self.created_date)),
        );
        map.insert(
            "updated_date".into(),
            Value::String(stamp(self.updated_date)),
        );
        Value::Object(map)
    }
}

/// Entity store over a single `entity_record` table (JSONB bodies).
#[derive(Clone)]
pub struct PgEntityStore {
    pool: PgPool,
}

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn select(
        &self,
        kind: EntityKind,
        fields: Option<&Record>,
        order: Option<&Order>,
    ) -> Result<Vec<Value>, StoreError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id, data, created_date, updated_date FROM entity_record WHERE entity_type = ",
        );
        qb.push_bind(kind.as_str());

        if let Some(fields) = fields.filter(|f| !f.is_empty()) {
            qb.push(" AND data @> ");
            qb.push_bind(Json(fields.clone()));
        }

        push_order(&mut qb, order);

        let rows: Vec<RecordRow> = qb.build_query_as::<RecordRow>().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(RecordRow::into_value).collect())
    }
}

fn push_order(qb: &mut QueryBuilder<'_, Postgres>, order: Option<&Order>) {
    let Some(order) = order else {
        qb.push(" ORDER BY created_date ASC, id ASC");
        return;
    };

    qb.push(" ORDER BY ");
    // system fields are real columns; anything else is a JSONB key
    if let Some(column) = SYSTEM_FIELDS.iter().find(|c| **c == order.field) {
        qb.push(*column);
    } else {
        qb.push("(data -> ");
        qb.push_bind(order.field.clone());
        qb.push(")");
    }
    qb.push(if order.descending { " DESC" } else { " ASC" });
    qb.push(", id ASC");
}

#[async_trait]
impl EntityStore for PgEntityStore {
    async fn list(&self, kind: EntityKind, order: Option<&Order>) -> Result<Vec<Value>, StoreError> {
        self.select(kind, None, order).await
    }

    async fn filter(
        &self,
        kind: EntityKind,
        fields: &Record,
        order: Option<&Order>,
    ) -> Result<Vec<Value>, StoreError> {
        self.select(kind, Some(fields), order).await
    }

    async fn get(&self, kind: EntityKind, id: Uuid) -> Result<Option<Value>, StoreError> {
        let row: Option<RecordRow> = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, data, created_date, updated_date
            FROM entity_record
            WHERE entity_type = $1 AND id = $2
            "#,
        )
        .bind(kind.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RecordRow::into_value))
    }

    async fn create(&self, kind: EntityKind, record: Record) -> Result<Value, StoreError> {
        let row: RecordRow = sqlx::query_as::<_, RecordRow>(
            r#"
            INSERT INTO entity_record (id, entity_type, data)
            VALUES ($1, $2, $3)
            RETURNING id, data, created_date, updated_date
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(kind.as_str())
        .bind(Json(strip_system_fields(record)))
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(entity = %kind, id = %row.id, "record created");
        Ok(row.into_value())
    }

    async fn update(&self, kind: EntityKind, id: Uuid, patch: Record) -> Result<Value, StoreError> {
        let row: Option<RecordRow> = sqlx::query_as::<_, RecordRow>(
            r#"
            UPDATE entity_record
            SET data = data || $3,
                updated_date = now()
            WHERE entity_type = $1 AND id = $2
            RETURNING id, data, created_date, updated_date
            "#,
        )
        .bind(kind.as_str())
        .bind(id)
        .bind(Json(strip_system_fields(patch)))
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or(StoreError::NotFound { kind, id })?;
        tracing::info!(entity = %kind, id = %id, "record updated");
        Ok(row.into_value())
    }

    async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<(), StoreError> {
        let res = sqlx::query(
            r#"
            DELETE FROM entity_record
            WHERE entity_type = $1 AND id = $2
            "#,
        )
        .bind(kind.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound { kind, id });
        }
        tracing::info!(entity = %kind, id = %id, "record deleted");
        Ok(())
    }
}
