use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::cache::{CONVERSATIONS, MESSAGES, QueryKey};
use crate::domain::conversation::{
    InboxFilter, agent_reply, assign_on_first_reply, initials, preview, set_status,
};
use crate::domain::entities::{Conversation, Message};
use crate::domain::vocab::{ConversationStatus, Tone};
use crate::error::ApiError;
use crate::middleware::auth_context::AuthContext;
use crate::models::{ApiOk, AppState};
use crate::routes::shared::{cached_filter, cached_list, invalidate};
use crate::store::{Collection, Record, Stored};

/// Newest first, like the inbox column.
const INBOX_ORDER: &str = "-created_date";
/// Threads read oldest first.
const THREAD_ORDER: &str = "created_date";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/conversations", get(list_conversations).post(create_conversation))
        .route("/conversations/{conversation_id}", get(get_conversation))
        .route("/conversations/{conversation_id}/status", post(update_status))
        .route(
            "/conversations/{conversation_id}/messages",
            get(list_messages).post(reply),
        )
}

pub(crate) async fn load_inbox(state: &AppState) -> Result<Vec<Stored<Conversation>>, ApiError> {
    cached_list::<Conversation>(
        state,
        QueryKey::new(CONVERSATIONS).with(INBOX_ORDER),
        Some(INBOX_ORDER),
    )
    .await
}

/// A conversation with the bits every list row renders.
#[derive(Debug, Serialize)]
pub struct ConversationCard {
    #[serde(flatten)]
    pub conversation: Stored<Conversation>,
    pub preview: String,
    pub initials: String,
    pub channel_label: String,
    pub channel_icon: &'static str,
    pub status_label: String,
    pub status_tone: Tone,
}

impl From<Stored<Conversation>> for ConversationCard {
    fn from(conversation: Stored<Conversation>) -> Self {
        let c = &conversation.data;
        ConversationCard {
            preview: preview(c).to_string(),
            initials: initials(&c.patient_name),
            channel_label: c.channel.label().to_string(),
            channel_icon: c.channel.icon(),
            status_label: c.status.label(),
            status_tone: c.status.tone(),
            conversation,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InboxQuery {
    pub status: Option<String>,
    pub search: Option<String>,
}

pub async fn list_conversations(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(q): Query<InboxQuery>,
) -> Result<Json<ApiOk<Vec<ConversationCard>>>, ApiError> {
    let filter = InboxFilter::new(q.status.as_deref(), q.search.as_deref());
    let convs = filter.apply(load_inbox(&state).await?);

    Ok(Json(ApiOk {
        data: convs.into_iter().map(ConversationCard::from).collect(),
    }))
}

pub async fn get_conversation(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<ApiOk<ConversationCard>>, ApiError> {
    let conv = Collection::<Conversation>::new(state.store.as_ref())
        .get(conversation_id)
        .await?;
    Ok(Json(ApiOk { data: conv.into() }))
}

pub async fn create_conversation(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(body): Json<Conversation>,
) -> Result<Json<ApiOk<Stored<Conversation>>>, ApiError> {
    if body.patient_name.trim().is_empty() {
        return Err(ApiError::validation("patient_name is required"));
    }
    if !body.channel.is_known() {
        tracing::warn!(canal = %body.channel, "conversation on an unrecognised channel");
    }

    let created = Collection::<Conversation>::new(state.store.as_ref())
        .create(&body)
        .await?;
    invalidate(&state, &[CONVERSATIONS]).await;

    tracing::info!(conversation_id = %created.id, channel = %created.data.channel, "conversation created");
    Ok(Json(ApiOk { data: created }))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: ConversationStatus,
}

pub async fn update_status(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(conversation_id): Path<Uuid>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<ApiOk<Stored<Conversation>>>, ApiError> {
    let convs = Collection::<Conversation>::new(state.store.as_ref());
    let mut conv = convs.get(conversation_id).await?;

    let patch = set_status(&mut conv.data, req.status);
    convs.update(conversation_id, &patch).await?;
    invalidate(&state, &[CONVERSATIONS]).await;

    tracing::info!(%conversation_id, status = %conv.data.status, "conversation status set");
    Ok(Json(ApiOk { data: conv }))
}

pub async fn list_messages(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<ApiOk<Vec<Stored<Message>>>>, ApiError> {
    let mut fields = Record::new();
    fields.insert("conversation_id".into(), json!(conversation_id));

    let thread = cached_filter::<Message>(
        &state,
        QueryKey::new(MESSAGES).with(conversation_id),
        fields,
        Some(THREAD_ORDER),
    )
    .await?;
    Ok(Json(ApiOk { data: thread }))
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    #[serde(rename = "conteudo")]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ReplyData {
    pub message: Stored<Message>,
    pub conversation: Stored<Conversation>,
}

/// Send an agent message; a waiting conversation is claimed by the sender.
pub async fn reply(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(conversation_id): Path<Uuid>,
    Json(req): Json<ReplyRequest>,
) -> Result<Json<ApiOk<ReplyData>>, ApiError> {
    let content = req.content.trim();
    if content.is_empty() {
        return Err(ApiError::validation("conteudo is required"));
    }

    let convs = Collection::<Conversation>::new(state.store.as_ref());
    let mut conv = convs.get(conversation_id).await?;
    let agent = auth.agent_ref();

    let message = Collection::<Message>::new(state.store.as_ref())
        .create(&agent_reply(conversation_id, &agent, content))
        .await?;
    invalidate(&state, &[MESSAGES]).await;

    let claimed = match assign_on_first_reply(&mut conv.data, &agent) {
        Some(patch) => convs.update(conversation_id, &patch).await.map(Some),
        None => Ok(None),
    };
    // the reply is stored even when the claim fails
    invalidate(&state, &[CONVERSATIONS]).await;
    if claimed?.is_some() {
        tracing::info!(%conversation_id, agent_id = ?agent.id, "conversation claimed");
    }

    tracing::info!(%conversation_id, message_id = %message.id, "reply sent");
    Ok(Json(ApiOk {
        data: ReplyData {
            message,
            conversation: conv,
        },
    }))
}
