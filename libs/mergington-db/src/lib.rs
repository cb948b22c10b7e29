pub mod models;
pub mod repositories;

pub use sqlx;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Opens the SQLite database at `url`, creating the file when missing, and
/// applies the embedded migrations.
pub async fn connect(url: &str) -> Result<SqlitePool> {
    if !url.starts_with("sqlite:") {
        return Err(anyhow::anyhow!("DATABASE_URL must start with sqlite: (got {})", url));
    }

    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("Invalid database url {}", url))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(10));

    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .connect_with(options)
        .await
        .context("Failed to connect to SQLite")?;

    migrate(&pool).await?;
    tracing::debug!("Database ready at {}", url);

    Ok(pool)
}

/// Private in-memory database for tests. A single connection that never
/// expires, since every new SQLite memory connection would start out empty.
#[cfg(any(test, feature = "test-util"))]
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .context("Failed to open in-memory SQLite")?;

    migrate(&pool).await?;

    Ok(pool)
}

async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run DB migrations")
}
