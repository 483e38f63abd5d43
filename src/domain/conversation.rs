// src/domain/conversation.rs

//! Conversation handling rules: claiming on first reply, status overwrite,
//! inbox filtering and the reply message an agent sends.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::{Conversation, Message};
use crate::domain::vocab::{ConversationStatus, MessageKind, Sender};
use crate::store::Stored;

/// Display name used when the agent's profile could not be loaded.
pub const DEFAULT_AGENT_NAME: &str = "Atendente";

/// The agent acting on a conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRef {
    pub id: Option<Uuid>,
    pub name: Option<String>,
}

/// Fields to persist after an in-memory change. Only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ConversationStatus>,
    #[serde(rename = "atendente_id", skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<Uuid>,
    #[serde(rename = "atendente_nome", skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
}

/// A waiting conversation is claimed by whoever replies first.
///
/// Moves `waiting` to `in_progress` and records the agent; any other status
/// is left alone and `None` is returned.
pub fn assign_on_first_reply(conv: &mut Conversation, agent: &AgentRef) -> Option<ConversationPatch> {
    if conv.status != ConversationStatus::Waiting {
        return None;
    }

    conv.status = ConversationStatus::InProgress;
    conv.agent_id = agent.id;
    conv.agent_name = agent.name.clone();

    Some(ConversationPatch {
        status: Some(ConversationStatus::InProgress),
        agent_id: agent.id,
        agent_name: agent.name.clone(),
    })
}

/// Unconditional overwrite; no transition is rejected.
pub fn set_status(conv: &mut Conversation, status: ConversationStatus) -> ConversationPatch {
    conv.status = status.clone();
    ConversationPatch {
        status: Some(status),
        ..ConversationPatch::default()
    }
}

/// Inbox list text: last message, else subject, else a placeholder.
pub fn preview(conv: &Conversation) -> &str {
    conv.last_message
        .as_deref()
        .filter(|s| !s.is_empty())
        .or(conv.subject.as_deref().filter(|s| !s.is_empty()))
        .unwrap_or("Nova conversa")
}

/// Status filter of the inbox; `None` keeps everything ("todos").
#[derive(Debug, Clone, Default)]
pub struct InboxFilter {
    pub status: Option<ConversationStatus>,
    pub search: Option<String>,
}

impl InboxFilter {
    pub fn new(status: Option<&str>, search: Option<&str>) -> Self {
        let status = status
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != "todos")
            .map(ConversationStatus::from);
        let search = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        Self { status, search }
    }

    pub fn matches(&self, conv: &Conversation) -> bool {
        let status_ok = self.status.as_ref().is_none_or(|s| *s == conv.status);
        let search_ok = self.search.as_deref().is_none_or(|term| {
            conv.patient_name.to_lowercase().contains(term)
                || conv
                    .subject
                    .as_deref()
                    .is_some_and(|s| s.to_lowercase().contains(term))
        });
        status_ok && search_ok
    }

    pub fn apply(&self, convs: Vec<Stored<Conversation>>) -> Vec<Stored<Conversation>> {
        convs.into_iter().filter(|c| self.matches(&c.data)).collect()
    }
}

/// The message an agent sends into a conversation.
pub fn agent_reply(conversation_id: Uuid, agent: &AgentRef, content: &str) -> Message {
    Message {
        conversation_id,
        sender: Sender::Agent,
        sender_name: Some(
            agent
                .name
                .clone()
                .unwrap_or_else(|| DEFAULT_AGENT_NAME.to_string()),
        ),
        content: content.to_string(),
        kind: MessageKind::Text,
        file_url: None,
        read: false,
        read_at: None,
    }
}

/// Two-letter initials for avatars ("?" when the name is blank).
pub fn initials(name: &str) -> String {
    let out: String = name
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect();
    if out.is_empty() { "?".to_string() } else { out }
}
