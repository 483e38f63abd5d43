mod auth;
mod cache;
mod config;
mod domain;
mod middleware;
mod store;

mod db;
mod error;
mod models;
mod routes;

use std::sync::Arc;

use axum::http::{Method, header};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::{cache::QueryCache, config::Config, models::AppState, store::PgEntityStore};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cfg = Config::from_env()?;
    tracing::info!(
        bind_addr = %cfg.bind_addr,
        session_ttl_hours = cfg.session_ttl_hours,
        db_max_connections = cfg.db_max_connections,
        "config loaded"
    );

    let pool = db::connect_pg(&cfg.database_url, cfg.db_max_connections).await?;

    // One store and one read cache shared by every request.
    let state = AppState {
        store: Arc::new(PgEntityStore::new(pool.clone())),
        cache: Arc::new(QueryCache::new()),
        db: pool,
        session_ttl_hours: cfg.session_ttl_hours,
    };

    // The helpdesk front-end is served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    let app = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    tracing::info!("Listening on http://{}", cfg.bind_addr);
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
