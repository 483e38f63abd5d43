use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use uuid::Uuid;

use crate::auth::hash_access_token;
use crate::domain::conversation::AgentRef;
use crate::error::ApiError;
use crate::models::{AppState, UserProfile, UserRow};

/// The signed-in user, resolved once per request from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: UserProfile,
    pub session_token_id: Uuid,
}

impl AuthContext {
    pub fn is_manager(&self) -> bool {
        self.user.is_manager()
    }

    pub fn agent_ref(&self) -> AgentRef {
        AgentRef {
            id: Some(self.user.id),
            name: Some(self.user.full_name.trim())
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SessionLookupRow {
    session_token_id: Uuid,
    #[sqlx(flatten)]
    user: UserRow,
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let TypedHeader(authz): TypedHeader<Authorization<Bearer>> =
                TypedHeader::from_request_parts(parts, state)
                    .await
                    .map_err(|_| ApiError::session_expired())?;

            let token_hash = hash_access_token(authz.token());

            // valid, unrevoked session of an active user
            let row: SessionLookupRow = sqlx::query_as::<_, SessionLookupRow>(
                r#"
                SELECT
                  st.session_token_id,
                  u.user_id, u.email, u.full_name, u.cargo, u.status_atendimento,
                  u.atendimentos_ativos, u.tempo_medio_resposta, u.avaliacao_media,
                  u.total_atendimentos
                FROM session_token st
                JOIN app_user u ON u.user_id = st.user_id
                WHERE st.session_token_hash = $1
                  AND st.revoked_at IS NULL
                  AND st.expires_at > now()
                  AND u.is_active = true
                "#,
            )
            .bind(&token_hash)
            .fetch_optional(&state.db)
            .await
            .map_err(ApiError::db)?
            .ok_or_else(ApiError::session_expired)?;

            // best-effort
            let _ = sqlx::query(
                r#"
                UPDATE session_token
                SET last_seen_at = now()
                WHERE session_token_id = $1
                "#,
            )
            .bind(row.session_token_id)
            .execute(&state.db)
            .await;

            Ok(AuthContext {
                user: row.user.into(),
                session_token_id: row.session_token_id,
            })
        }
    }
}

/// Optional identity: a failed lookup is logged and the request continues
/// anonymously with default navigation and display name.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<AuthContext>);

impl Viewer {
    pub fn is_manager(&self) -> bool {
        self.0.as_ref().is_some_and(AuthContext::is_manager)
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            match AuthContext::from_request_parts(parts, state).await {
                Ok(auth) => Ok(Viewer(Some(auth))),
                Err(e) => {
                    tracing::warn!(error = ?e, "current user lookup failed; continuing anonymously");
                    Ok(Viewer(None))
                }
            }
        }
    }
}
