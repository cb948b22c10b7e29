use anyhow::Result;
use mergington_db::models::activity::{ActivityCatalog, ActivityDetails};
use mergington_db::repositories::activity_repo::ActivityRepository;
use mergington_db::repositories::participant_repo::ParticipantRepository;
use sqlx::SqlitePool;
use std::collections::HashMap;

/// Read side: assembles activities together with their participant emails.
#[derive(Debug, Clone)]
pub struct ActivityService {
    activities: ActivityRepository,
    participants: ParticipantRepository,
}

impl ActivityService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            activities: ActivityRepository::new(pool.clone()),
            participants: ParticipantRepository::new(pool),
        }
    }

    pub async fn list_activities(&self) -> Result<ActivityCatalog> {
        let activities = self.activities.get_all().await?;

        let mut emails: HashMap<i64, Vec<String>> = HashMap::new();
        for participant in self.participants.get_all().await? {
            emails.entry(participant.activity_id).or_default().push(participant.email);
        }

        let catalog = activities
            .into_iter()
            .map(|activity| {
                let participants = emails.remove(&activity.id).unwrap_or_default();
                let details = ActivityDetails::new(&activity, participants);
                (activity.name, details)
            })
            .collect();

        Ok(ActivityCatalog(catalog))
    }

    pub async fn activity_count(&self) -> Result<i64> {
        self.activities.count().await
    }
}
