// src/routes/shared.rs

use crate::cache::QueryKey;
use crate::error::ApiError;
use crate::middleware::auth_context::AuthContext;
use crate::models::AppState;
use crate::store::{Entity, Order, Record, Stored};

/// Whole collection through the query cache.
pub(crate) async fn cached_list<E: Entity>(
    state: &AppState,
    key: QueryKey,
    order: Option<&str>,
) -> Result<Vec<Stored<E>>, ApiError> {
    let store = state.store.as_ref();
    let snapshot = state
        .cache
        .get_or_fetch(key, move || async move {
            let order = order.map(Order::parse);
            store.list(E::KIND, order.as_ref()).await
        })
        .await?;
    Ok(Stored::<E>::decode_all(&snapshot))
}

/// Field-equality filter through the query cache.
pub(crate) async fn cached_filter<E: Entity>(
    state: &AppState,
    key: QueryKey,
    fields: Record,
    order: Option<&str>,
) -> Result<Vec<Stored<E>>, ApiError> {
    let store = state.store.as_ref();
    let snapshot = state
        .cache
        .get_or_fetch(key, move || async move {
            let order = order.map(Order::parse);
            store.filter(E::KIND, &fields, order.as_ref()).await
        })
        .await?;
    Ok(Stored::<E>::decode_all(&snapshot))
}

/// Discard every cached read under each root key.
pub(crate) async fn invalidate(state: &AppState, roots: &[&str]) {
    for root in roots {
        state.cache.invalidate(&QueryKey::new(root)).await;
    }
}

pub(crate) fn ensure_manager(auth: &AuthContext, action: &str) -> Result<(), ApiError> {
    if auth.is_manager() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "FORBIDDEN",
            format!("Only managers can {action}"),
        ))
    }
}
