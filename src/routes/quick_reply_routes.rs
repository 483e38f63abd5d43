use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::{QUICK_REPLIES, QueryKey};
use crate::domain::entities::QuickReply;
use crate::domain::quick_reply::{find_by_shortcut, validate_quick_reply};
use crate::error::ApiError;
use crate::middleware::auth_context::AuthContext;
use crate::models::{ApiOk, AppState, OkData};
use crate::routes::shared::{cached_list, ensure_manager, invalidate};
use crate::store::{Collection, Stored};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/quick_replies", get(list_quick_replies).post(create_quick_reply))
        .route("/quick_replies/expand", post(expand_shortcut))
        .route("/quick_replies/{quick_reply_id}", delete(delete_quick_reply))
}

async fn load_quick_replies(state: &AppState) -> Result<Vec<Stored<QuickReply>>, ApiError> {
    cached_list::<QuickReply>(state, QueryKey::new(QUICK_REPLIES), None).await
}

pub async fn list_quick_replies(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<ApiOk<Vec<Stored<QuickReply>>>>, ApiError> {
    let replies = load_quick_replies(&state).await?;
    Ok(Json(ApiOk { data: replies }))
}

pub async fn create_quick_reply(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(body): Json<QuickReply>,
) -> Result<Json<ApiOk<Stored<QuickReply>>>, ApiError> {
    ensure_manager(&auth, "manage quick replies")?;
    validate_quick_reply(&body).map_err(ApiError::validation)?;

    let created = Collection::<QuickReply>::new(state.store.as_ref())
        .create(&body)
        .await?;
    invalidate(&state, &[QUICK_REPLIES]).await;

    tracing::info!(quick_reply_id = %created.id, atalho = ?created.data.shortcut, "quick reply created");
    Ok(Json(ApiOk { data: created }))
}

pub async fn delete_quick_reply(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(quick_reply_id): Path<Uuid>,
) -> Result<Json<ApiOk<OkData>>, ApiError> {
    ensure_manager(&auth, "manage quick replies")?;

    Collection::<QuickReply>::new(state.store.as_ref())
        .delete(quick_reply_id)
        .await?;
    invalidate(&state, &[QUICK_REPLIES]).await;

    tracing::info!(%quick_reply_id, "quick reply deleted");
    Ok(Json(ApiOk {
        data: OkData { ok: true },
    }))
}

#[derive(Debug, Deserialize)]
pub struct ExpandRequest {
    #[serde(rename = "texto")]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ExpandData {
    pub expanded: bool,
    /// The reply's content when a shortcut matched, else the draft as sent.
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quick_reply_id: Option<Uuid>,
}

pub async fn expand_shortcut(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(req): Json<ExpandRequest>,
) -> Result<Json<ApiOk<ExpandData>>, ApiError> {
    let replies = load_quick_replies(&state).await?;
    let hit = replies
        .iter()
        .find(|r| find_by_shortcut(std::slice::from_ref(&r.data), &req.text).is_some());

    let data = match hit {
        Some(reply) => ExpandData {
            expanded: true,
            text: reply.data.content.clone(),
            quick_reply_id: Some(reply.id),
        },
        None => ExpandData {
            expanded: false,
            text: req.text,
            quick_reply_id: None,
        },
    };

    Ok(Json(ApiOk { data }))
}
