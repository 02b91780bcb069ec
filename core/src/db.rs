// storefront/src/db.rs

//! Pool construction and the embedded schema migrations.

use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::{info, instrument};

/// Opens a pool for `database_url` (e.g. `sqlite://storefront.db`), creating the
/// file if needed. Foreign keys are enforced on every connection.
#[instrument(name = "db::connect", skip(database_url))]
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
  let options = SqliteConnectOptions::from_str(database_url)?
    .create_if_missing(true)
    .foreign_keys(true);

  let pool = SqlitePoolOptions::new()
    .max_connections(max_connections)
    .connect_with(options)
    .await?;
  info!(max_connections, "Database pool opened.");
  Ok(pool)
}

/// A private in-memory database on a single connection that never expires.
pub async fn connect_in_memory() -> Result<SqlitePool> {
  let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
  let pool = SqlitePoolOptions::new()
    .max_connections(1)
    .idle_timeout(None)
    .max_lifetime(None)
    .connect_with(options)
    .await?;
  Ok(pool)
}

#[instrument(name = "db::migrate", skip(pool))]
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
  sqlx::migrate!("./migrations").run(pool).await?;
  info!("Database migrations applied.");
  Ok(())
}
