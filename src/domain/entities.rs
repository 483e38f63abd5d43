// src/domain/entities.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::vocab::{
    AppointmentStatus, Channel, ConsultationType, ConversationStatus, InsurancePlan, MessageKind,
    PatientStatus, Priority, QuickReplyCategory, Sender, Specialty,
};
use crate::store::{Entity, EntityKind};

/* -------------------------
   Patient
--------------------------*/

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    #[serde(rename = "nome_completo", default)]
    pub full_name: String,
    #[serde(rename = "telefone", default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "cpf", default, skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    /// yyyy-MM-dd
    #[serde(rename = "data_nascimento", default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(rename = "endereco", default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "convenio", default)]
    pub insurance: InsurancePlan,
    #[serde(rename = "observacoes", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "canais_preferidos", default, skip_serializing_if = "Vec::is_empty")]
    pub preferred_channels: Vec<Channel>,
    #[serde(default)]
    pub status: PatientStatus,
}

impl Entity for Patient {
    const KIND: EntityKind = EntityKind::Patient;
}

/* -------------------------
   Conversation
--------------------------*/

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<Uuid>,
    #[serde(default)]
    pub patient_name: String,
    #[serde(rename = "canal")]
    pub channel: Channel,
    #[serde(default)]
    pub status: ConversationStatus,
    #[serde(rename = "prioridade", default)]
    pub priority: Priority,
    #[serde(rename = "atendente_id", default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<Uuid>,
    #[serde(rename = "atendente_nome", default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(rename = "assunto", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(rename = "ultima_mensagem", default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    #[serde(rename = "data_ultima_mensagem", default, skip_serializing_if = "Option::is_none")]
    pub last_message_at: Option<String>,
    /// Minutes until the first agent reply.
    #[serde(rename = "tempo_primeira_resposta", default, skip_serializing_if = "Option::is_none")]
    pub first_response_minutes: Option<f64>,
    /// Minutes until the conversation was resolved.
    #[serde(rename = "tempo_resolucao", default, skip_serializing_if = "Option::is_none")]
    pub resolution_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// 1 to 5; 0 means not rated.
    #[serde(rename = "satisfacao", default, skip_serializing_if = "Option::is_none")]
    pub satisfaction: Option<f64>,
}

impl Entity for Conversation {
    const KIND: EntityKind = EntityKind::Conversation;
}

/* -------------------------
   Message
--------------------------*/

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub conversation_id: Uuid,
    #[serde(rename = "remetente")]
    pub sender: Sender,
    #[serde(rename = "remetente_nome", default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(rename = "conteudo", default)]
    pub content: String,
    #[serde(rename = "tipo", default)]
    pub kind: MessageKind,
    #[serde(rename = "arquivo_url", default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(rename = "lida", default)]
    pub read: bool,
    #[serde(rename = "data_leitura", default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<String>,
}

impl Entity for Message {
    const KIND: EntityKind = EntityKind::Message;
}

/* -------------------------
   Appointment
--------------------------*/

fn default_duration() -> f64 {
    30.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<Uuid>,
    #[serde(default)]
    pub patient_name: String,
    #[serde(rename = "especialidade")]
    pub specialty: Specialty,
    #[serde(rename = "medico", default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<String>,
    /// ISO date-time exactly as entered (`2024-03-05T10:00` or RFC 3339).
    #[serde(rename = "data_hora", default)]
    pub date_time: String,
    #[serde(rename = "duracao", default = "default_duration")]
    pub duration_minutes: f64,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(rename = "tipo_consulta", default, skip_serializing_if = "Option::is_none")]
    pub consultation_type: Option<ConsultationType>,
    #[serde(rename = "convenio", default, skip_serializing_if = "Option::is_none")]
    pub insurance: Option<String>,
    #[serde(rename = "observacoes", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "lembrete_enviado", default)]
    pub reminder_sent: bool,
    #[serde(rename = "confirmado_pelo_paciente", default)]
    pub patient_confirmed: bool,
}

impl Entity for Appointment {
    const KIND: EntityKind = EntityKind::Appointment;
}

/* -------------------------
   QuickReply
--------------------------*/

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickReply {
    #[serde(rename = "titulo", default)]
    pub title: String,
    #[serde(rename = "atalho", default, skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,
    #[serde(rename = "conteudo", default)]
    pub content: String,
    #[serde(rename = "categoria", default)]
    pub category: QuickReplyCategory,
    #[serde(rename = "ativo", default = "default_true")]
    pub active: bool,
}

impl Entity for QuickReply {
    const KIND: EntityKind = EntityKind::QuickReply;
}
