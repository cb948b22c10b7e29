use crate::error::AppError;
use mergington_db::models::activity::Activity;
use mergington_db::repositories::activity_repo::ActivityRepository;
use mergington_db::repositories::participant_repo::ParticipantRepository;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

// Takes the write lock up front. A deferred transaction that has already read
// cannot be upgraded once another writer commits, and fails with SQLITE_BUSY.
const BEGIN_WRITE: &str = "BEGIN IMMEDIATE";

// Capacity and uniqueness are re-checked by the insert itself so that a
// concurrent writer can never push an activity past its limit.
const GUARDED_INSERT: &str = r#"
    INSERT INTO participants (activity_id, email)
    SELECT ?1, ?2
    WHERE NOT EXISTS (SELECT 1 FROM participants WHERE activity_id = ?1 AND email = ?2)
      AND (SELECT COUNT(*) FROM participants WHERE activity_id = ?1) < ?3
"#;

#[derive(Debug, Clone)]
pub struct SignupService {
    pool: SqlitePool,
}

impl SignupService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn signup(&self, activity_name: &str, email: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin_with(BEGIN_WRITE).await?;
        let activity = find_activity(&mut tx, activity_name).await?;
        let emails = ParticipantRepository::emails_for_activity(&mut tx, activity.id).await?;

        if emails.iter().any(|e| e == email) {
            return Err(AppError::AlreadySignedUp);
        }
        if emails.len() as i64 >= activity.max_participants {
            return Err(AppError::ActivityFull);
        }

        let result = sqlx::query(GUARDED_INSERT)
            .bind(activity.id)
            .bind(email)
            .bind(activity.max_participants)
            .execute(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::AlreadySignedUp,
                other => AppError::Database(other),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::ActivityFull);
        }

        tx.commit().await?;
        info!("Signed up {} for {}", email, activity_name);

        Ok(())
    }

    pub async fn unregister(&self, activity_name: &str, email: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin_with(BEGIN_WRITE).await?;
        let activity = find_activity(&mut tx, activity_name).await?;

        let result = sqlx::query("DELETE FROM participants WHERE activity_id = ? AND email = ?")
            .bind(activity.id)
            .bind(email)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotSignedUp);
        }

        tx.commit().await?;
        info!("Unregistered {} from {}", email, activity_name);

        Ok(())
    }
}

async fn find_activity(conn: &mut SqliteConnection, name: &str) -> Result<Activity, AppError> {
    ActivityRepository::find_by_name(conn, name)
        .await?
        .ok_or(AppError::ActivityNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::seed_service::SeedService;
    use mergington_db::connect_in_memory;

    async fn seeded() -> (SignupService, SqlitePool) {
        let pool = connect_in_memory().await.unwrap();
        SeedService::new(pool.clone()).seed().await.unwrap();
        (SignupService::new(pool.clone()), pool)
    }

    async fn emails(pool: &SqlitePool, activity: &str) -> Vec<String> {
        let mut conn = pool.acquire().await.unwrap();
        let activity = ActivityRepository::find_by_name(&mut conn, activity)
            .await
            .unwrap()
            .unwrap();
        ParticipantRepository::emails_for_activity(&mut conn, activity.id)
            .await
            .unwrap()
    }

    async fn add_activity(pool: &SqlitePool, name: &str, max: i64) {
        sqlx::query("INSERT INTO activities (name, max_participants) VALUES (?, ?)")
            .bind(name)
            .bind(max)
            .execute(pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn chess_club_signup_then_duplicate() {
        let (service, pool) = seeded().await;
        assert_eq!(emails(&pool, "Chess Club").await.len(), 2);

        service.signup("Chess Club", "new.student@mergington.edu").await.unwrap();
        let after = emails(&pool, "Chess Club").await;
        assert_eq!(after.len(), 3);
        assert_eq!(after[2], "new.student@mergington.edu");

        let err = service.signup("Chess Club", "new.student@mergington.edu").await.unwrap_err();
        assert!(matches!(err, AppError::AlreadySignedUp));
        assert_eq!(emails(&pool, "Chess Club").await.len(), 3);
    }

    #[tokio::test]
    async fn unknown_activity_is_not_found() {
        let (service, pool) = seeded().await;

        let err = service.signup("Underwater Basket Weaving", "a@mergington.edu").await.unwrap_err();
        assert!(matches!(err, AppError::ActivityNotFound));

        let err = service.unregister("Underwater Basket Weaving", "a@mergington.edu").await.unwrap_err();
        assert!(matches!(err, AppError::ActivityNotFound));

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM participants")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(total, 18);
    }

    #[tokio::test]
    async fn full_activity_rejects_signup() {
        let pool = connect_in_memory().await.unwrap();
        add_activity(&pool, "Tiny Club", 1).await;
        let service = SignupService::new(pool.clone());

        service.signup("Tiny Club", "first@mergington.edu").await.unwrap();
        let err = service.signup("Tiny Club", "second@mergington.edu").await.unwrap_err();

        assert!(matches!(err, AppError::ActivityFull));
        assert_eq!(emails(&pool, "Tiny Club").await, vec!["first@mergington.edu"]);
    }

    #[tokio::test]
    async fn zero_capacity_activity_is_always_full() {
        let pool = connect_in_memory().await.unwrap();
        add_activity(&pool, "Closed Club", 0).await;

        let err = SignupService::new(pool).signup("Closed Club", "a@mergington.edu").await.unwrap_err();
        assert!(matches!(err, AppError::ActivityFull));
    }

    #[tokio::test]
    async fn duplicate_is_reported_before_capacity() {
        let pool = connect_in_memory().await.unwrap();
        add_activity(&pool, "Tiny Club", 1).await;
        let service = SignupService::new(pool);

        service.signup("Tiny Club", "first@mergington.edu").await.unwrap();
        let err = service.signup("Tiny Club", "first@mergington.edu").await.unwrap_err();

        assert!(matches!(err, AppError::AlreadySignedUp));
    }

    #[tokio::test]
    async fn same_email_may_join_different_activities() {
        let (service, pool) = seeded().await;

        service.signup("Art Club", "michael@mergington.edu").await.unwrap();

        assert!(emails(&pool, "Art Club").await.contains(&"michael@mergington.edu".to_string()));
        assert!(emails(&pool, "Chess Club").await.contains(&"michael@mergington.edu".to_string()));
    }

    #[tokio::test]
    async fn unregister_removes_only_that_signup() {
        let (service, pool) = seeded().await;
        service.signup("Art Club", "michael@mergington.edu").await.unwrap();

        service.unregister("Chess Club", "michael@mergington.edu").await.unwrap();

        assert_eq!(emails(&pool, "Chess Club").await, vec!["daniel@mergington.edu"]);
        assert!(emails(&pool, "Art Club").await.contains(&"michael@mergington.edu".to_string()));
    }

    #[tokio::test]
    async fn unregister_absent_email_leaves_state_unchanged() {
        let (service, pool) = seeded().await;

        let err = service.unregister("Chess Club", "nobody@mergington.edu").await.unwrap_err();

        assert!(matches!(err, AppError::NotSignedUp));
        assert_eq!(emails(&pool, "Chess Club").await.len(), 2);
    }

    #[tokio::test]
    async fn freed_seat_can_be_taken_again() {
        let pool = connect_in_memory().await.unwrap();
        add_activity(&pool, "Tiny Club", 1).await;
        let service = SignupService::new(pool.clone());

        service.signup("Tiny Club", "first@mergington.edu").await.unwrap();
        service.unregister("Tiny Club", "first@mergington.edu").await.unwrap();
        service.signup("Tiny Club", "second@mergington.edu").await.unwrap();

        assert_eq!(emails(&pool, "Tiny Club").await, vec!["second@mergington.edu"]);
    }

    #[tokio::test]
    async fn capacity_holds_across_many_signups() {
        let pool = connect_in_memory().await.unwrap();
        add_activity(&pool, "Math Circle", 3).await;
        let service = SignupService::new(pool.clone());

        let mut accepted = 0;
        for i in 0..10 {
            if service.signup("Math Circle", &format!("student{i}@mergington.edu")).await.is_ok() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 3);
        assert_eq!(emails(&pool, "Math Circle").await.len(), 3);
    }

    async fn file_backed() -> (tempfile::TempDir, SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("activities.db").display());
        let pool = mergington_db::connect(&url).await.unwrap();
        (dir, pool)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_signups_fill_exactly_to_capacity() {
        let (_dir, pool) = file_backed().await;
        add_activity(&pool, "Robotics", 5).await;
        let service = SignupService::new(pool.clone());

        let handles: Vec<_> = (0..30)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service.signup("Robotics", &format!("student{i}@mergington.edu")).await
                })
            })
            .collect();

        let (mut accepted, mut full) = (0, 0);
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => accepted += 1,
                Err(AppError::ActivityFull) => full += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(accepted, 5);
        assert_eq!(full, 25);
        assert_eq!(emails(&pool, "Robotics").await.len(), 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_signups_below_capacity_all_succeed() {
        let (_dir, pool) = file_backed().await;
        add_activity(&pool, "Choir", 1000).await;
        let service = SignupService::new(pool.clone());

        let handles: Vec<_> = (0..40)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service.signup("Choir", &format!("singer{i}@mergington.edu")).await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(emails(&pool, "Choir").await.len(), 40);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_unregisters_remove_each_signup_once() {
        let (_dir, pool) = file_backed().await;
        add_activity(&pool, "Robotics", 10).await;
        let service = SignupService::new(pool.clone());
        for i in 0..5 {
            service.signup("Robotics", &format!("student{i}@mergington.edu")).await.unwrap();
        }

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service.unregister("Robotics", &format!("student{}@mergington.edu", i % 5)).await
                })
            })
            .collect();

        let (mut removed, mut absent) = (0, 0);
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => removed += 1,
                Err(AppError::NotSignedUp) => absent += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(removed, 5);
        assert_eq!(absent, 5);
        assert!(emails(&pool, "Robotics").await.is_empty());
    }
}
