use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::QueryCache;
use crate::domain::vocab::{Availability, UserRole};
use crate::store::EntityStore;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub store: Arc<dyn EntityStore>,
    pub cache: Arc<QueryCache>,
    pub session_ttl_hours: i64,
}

/* -------------------------
   API envelopes
--------------------------*/

#[derive(Debug, Serialize)]
pub struct ApiOk<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct OkData {
    pub ok: bool,
}

/* -------------------------
   Auth DTOs
--------------------------*/

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub device_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponseData {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserProfile,
}

/* -------------------------
   Users (owned by the auth provider)
--------------------------*/

#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub cargo: String,
    pub status_atendimento: Option<String>,
    pub atendimentos_ativos: Option<i32>,
    pub tempo_medio_resposta: Option<f64>,
    pub avaliacao_media: Option<f64>,
    pub total_atendimentos: Option<i32>,
}

/// Column list matching [`UserRow`].
pub const USER_COLUMNS: &str = r#"
    user_id, email, full_name, cargo, status_atendimento,
    atendimentos_ativos, tempo_medio_resposta, avaliacao_media, total_atendimentos
"#;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(rename = "cargo")]
    pub role: UserRole,
    #[serde(rename = "status_atendimento")]
    pub availability: Option<Availability>,
    #[serde(rename = "atendimentos_ativos")]
    pub active_conversations: Option<i32>,
    #[serde(rename = "tempo_medio_resposta")]
    pub avg_response_minutes: Option<f64>,
    #[serde(rename = "avaliacao_media")]
    pub avg_rating: Option<f64>,
    #[serde(rename = "total_atendimentos")]
    pub total_handled: Option<i32>,
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        UserProfile {
            id: row.user_id,
            full_name: row.full_name,
            email: row.email,
            role: UserRole::from(row.cargo),
            availability: row.status_atendimento.map(Availability::from),
            active_conversations: row.atendimentos_ativos,
            avg_response_minutes: row.tempo_medio_resposta,
            avg_rating: row.avaliacao_media,
            total_handled: row.total_atendimentos,
        }
    }
}

impl UserProfile {
    pub fn is_manager(&self) -> bool {
        self.role == UserRole::Manager
    }

    pub fn is_agent(&self) -> bool {
        self.role == UserRole::Agent
    }
}
