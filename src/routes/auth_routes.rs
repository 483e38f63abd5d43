use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::{generate_access_token, hash_access_token, verify_password},
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{
        ApiOk, AppState, LoginRequest, LoginResponseData, OkData, USER_COLUMNS, UserProfile,
        UserRow,
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/logout", post(logout))
}

#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
    is_active: bool,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiOk<LoginResponseData>>, ApiError> {
    let email = req.email.trim();
    if email.is_empty() || req.password.is_empty() {
        return Err(ApiError::validation("email and password are required"));
    }

    // 1) Load user by email
    let sql = format!(
        "SELECT {USER_COLUMNS}, password_hash, is_active FROM app_user WHERE lower(email) = lower($1)"
    );
    let row: CredentialRow = sqlx::query_as::<_, CredentialRow>(&sql)
        .bind(email)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::db)?
        .ok_or_else(ApiError::invalid_credentials)?;

    if !row.is_active {
        return Err(ApiError::Forbidden("FORBIDDEN", "Account is disabled".into()));
    }

    // 2) Verify password
    if !verify_password(&req.password, &row.password_hash) {
        tracing::warn!(email, "login rejected");
        return Err(ApiError::invalid_credentials());
    }

    // 3) Create session_token
    let access_token = generate_access_token();
    let token_hash = hash_access_token(&access_token);
    let expires_at = Utc::now() + Duration::hours(state.session_ttl_hours);

    let (session_token_id, expires_at): (Uuid, DateTime<Utc>) = sqlx::query_as(
        r#"
        INSERT INTO session_token
            (user_id, session_token_hash, device_name, expires_at)
        VALUES
            ($1, $2, $3, $4)
        RETURNING session_token_id, expires_at
        "#,
    )
    .bind(row.user.user_id)
    .bind(&token_hash)
    .bind(req.device_name.as_deref())
    .bind(expires_at)
    .fetch_one(&state.db)
    .await
    .map_err(ApiError::db)?;

    tracing::info!(user_id = %row.user.user_id, %session_token_id, "session opened");

    Ok(Json(ApiOk {
        data: LoginResponseData {
            access_token,
            expires_at,
            user: row.user.into(),
        },
    }))
}

#[derive(Debug, Serialize)]
pub struct MeData {
    pub user: UserProfile,
    pub session_token_id: Uuid,
}

pub async fn me(auth: AuthContext) -> Result<Json<ApiOk<MeData>>, ApiError> {
    Ok(Json(ApiOk {
        data: MeData {
            user: auth.user,
            session_token_id: auth.session_token_id,
        },
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiOk<OkData>>, ApiError> {
    let rows = sqlx::query(
        r#"
        UPDATE session_token
        SET revoked_at = now()
        WHERE session_token_id = $1
          AND user_id = $2
          AND revoked_at IS NULL
        "#,
    )
    .bind(auth.session_token_id)
    .bind(auth.user.id)
    .execute(&state.db)
    .await
    .map_err(ApiError::db)?;

    if rows.rows_affected() == 0 {
        return Err(ApiError::session_expired());
    }

    tracing::info!(user_id = %auth.user.id, "session revoked");

    Ok(Json(ApiOk {
        data: OkData { ok: true },
    }))
}
