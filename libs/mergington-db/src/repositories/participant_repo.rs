use sqlx::{SqliteConnection, SqlitePool};
use anyhow::{Context, Result};
use crate::models::participant::Participant;

#[derive(Clone, Debug)]
pub struct ParticipantRepository {
    pool: SqlitePool,
}

impl ParticipantRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every signup, grouped by activity and in signup order within each.
    pub async fn get_all(&self) -> Result<Vec<Participant>> {
        sqlx::query_as::<_, Participant>(
            "SELECT id, activity_id, email FROM participants ORDER BY activity_id ASC, id ASC"
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch participants")
    }

    /// Emails signed up for one activity, in signup order. Runs on the
    /// caller's connection so it can take part in a transaction.
    pub async fn emails_for_activity(conn: &mut SqliteConnection, activity_id: i64) -> sqlx::Result<Vec<String>> {
        sqlx::query_scalar("SELECT email FROM participants WHERE activity_id = ? ORDER BY id ASC")
            .bind(activity_id)
            .fetch_all(conn)
            .await
    }
}
