use anyhow::Context;
use sqlx::{PgPool, postgres::PgPoolOptions};

/// Connect and bring the schema up to date.
pub async fn connect_pg(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to apply migrations")?;

    tracing::info!("database ready");
    Ok(pool)
}
