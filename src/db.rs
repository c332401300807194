use anyhow::Context;
use sqlx::{mysql::MySqlPoolOptions, Connection, MySqlPool};
use tracing::info;

use crate::config::AppConfig;

/// Opens the shared pool and pings one connection; any failure aborts startup.
pub async fn connect(config: &AppConfig) -> anyhow::Result<MySqlPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.db_acquire_timeout)
        .connect(&config.database_url)
        .await
        .context("connect to database")?;

    let mut conn = pool.acquire().await.context("acquire connection")?;
    conn.ping().await.context("ping database")?;
    drop(conn);

    info!(
        max_connections = config.db_max_connections,
        "connected to database"
    );
    Ok(pool)
}
