use sqlx::{SqliteConnection, SqlitePool};
use anyhow::{Context, Result};
use crate::models::activity::Activity;

#[derive(Clone, Debug)]
pub struct ActivityRepository {
    pool: SqlitePool,
}

impl ActivityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_all(&self) -> Result<Vec<Activity>> {
        sqlx::query_as::<_, Activity>(
            "SELECT id, name, description, schedule, max_participants FROM activities ORDER BY id ASC"
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch activities")
    }

    pub async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM activities")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count activities")
    }

    /// Runs on the caller's connection so it can take part in a transaction.
    pub async fn find_by_name(conn: &mut SqliteConnection, name: &str) -> sqlx::Result<Option<Activity>> {
        sqlx::query_as::<_, Activity>(
            "SELECT id, name, description, schedule, max_participants FROM activities WHERE name = ?"
        )
        .bind(name)
        .fetch_optional(conn)
        .await
    }
}
