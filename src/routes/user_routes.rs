// src/routes/user_routes.rs

use axum::{Json, Router, extract::State, routing::get};

use crate::{
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{ApiOk, AppState, USER_COLUMNS, UserProfile, UserRow},
};

pub fn router() -> Router<AppState> {
    // Accounts are provisioned outside this service; the directory is read-only.
    Router::new().route("/users", get(list_users))
}

/// Active staff accounts, alphabetical.
pub(crate) async fn load_users(state: &AppState) -> Result<Vec<UserProfile>, ApiError> {
    let sql = format!(
        "SELECT {USER_COLUMNS} FROM app_user WHERE is_active = true ORDER BY full_name ASC"
    );
    let rows: Vec<UserRow> = sqlx::query_as::<_, UserRow>(&sql)
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::db)?;

    Ok(rows.into_iter().map(UserProfile::from).collect())
}

pub async fn list_users(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<ApiOk<Vec<UserProfile>>>, ApiError> {
    let users = load_users(&state).await?;
    Ok(Json(ApiOk { data: users }))
}
