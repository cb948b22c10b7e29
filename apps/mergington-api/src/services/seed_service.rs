use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::info;

struct SeedActivity {
    name: &'static str,
    description: &'static str,
    schedule: &'static str,
    max_participants: i64,
    participants: [&'static str; 2],
}

const INITIAL_ACTIVITIES: [SeedActivity; 9] = [
    SeedActivity {
        name: "Chess Club",
        description: "Learn strategies and compete in chess tournaments",
        schedule: "Fridays, 3:30 PM - 5:00 PM",
        max_participants: 12,
        participants: ["michael@mergington.edu", "daniel@mergington.edu"],
    },
    SeedActivity {
        name: "Programming Class",
        description: "Learn programming fundamentals and build software projects",
        schedule: "Tuesdays and Thursdays, 3:30 PM - 4:30 PM",
        max_participants: 20,
        participants: ["emma@mergington.edu", "sophia@mergington.edu"],
    },
    SeedActivity {
        name: "Gym Class",
        description: "Physical education and sports activities",
        schedule: "Mondays, Wednesdays, Fridays, 2:00 PM - 3:00 PM",
        max_participants: 30,
        participants: ["john@mergington.edu", "olivia@mergington.edu"],
    },
    SeedActivity {
        name: "Soccer Team",
        description: "Join the school soccer team and compete in matches",
        schedule: "Tuesdays and Thursdays, 4:00 PM - 5:30 PM",
        max_participants: 22,
        participants: ["liam@mergington.edu", "noah@mergington.edu"],
    },
    SeedActivity {
        name: "Basketball Team",
        description: "Practice and play basketball with the school team",
        schedule: "Wednesdays and Fridays, 3:30 PM - 5:00 PM",
        max_participants: 15,
        participants: ["ava@mergington.edu", "mia@mergington.edu"],
    },
    SeedActivity {
        name: "Art Club",
        description: "Explore your creativity through painting and drawing",
        schedule: "Thursdays, 3:30 PM - 5:00 PM",
        max_participants: 15,
        participants: ["amelia@mergington.edu", "harper@mergington.edu"],
    },
    SeedActivity {
        name: "Drama Club",
        description: "Act, direct, and produce plays and performances",
        schedule: "Mondays and Wednesdays, 4:00 PM - 5:30 PM",
        max_participants: 20,
        participants: ["ella@mergington.edu", "scarlett@mergington.edu"],
    },
    SeedActivity {
        name: "Math Club",
        description: "Solve challenging problems and participate in math competitions",
        schedule: "Tuesdays, 3:30 PM - 4:30 PM",
        max_participants: 10,
        participants: ["james@mergington.edu", "benjamin@mergington.edu"],
    },
    SeedActivity {
        name: "Debate Team",
        description: "Develop public speaking and argumentation skills",
        schedule: "Fridays, 4:00 PM - 5:30 PM",
        max_participants: 12,
        participants: ["charlotte@mergington.edu", "henry@mergington.edu"],
    },
];

#[derive(Debug, Clone)]
pub struct SeedService {
    pool: SqlitePool,
}

impl SeedService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts the default catalog into an empty store. Returns how many
    /// activities were inserted; 0 means the store already had data.
    pub async fn seed(&self) -> Result<usize> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let populated: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM activities)")
            .fetch_one(&mut *tx)
            .await
            .context("Failed to check for existing activities")?;

        if populated {
            info!("Activities already present, skipping seed");
            return Ok(0);
        }

        for seed in &INITIAL_ACTIVITIES {
            let activity_id: i64 = sqlx::query_scalar(
                "INSERT INTO activities (name, description, schedule, max_participants) VALUES (?, ?, ?, ?) RETURNING id"
            )
            .bind(seed.name)
            .bind(seed.description)
            .bind(seed.schedule)
            .bind(seed.max_participants)
            .fetch_one(&mut *tx)
            .await
            .with_context(|| format!("Failed to seed activity {}", seed.name))?;

            for email in seed.participants {
                sqlx::query("INSERT INTO participants (activity_id, email) VALUES (?, ?)")
                    .bind(activity_id)
                    .bind(email)
                    .execute(&mut *tx)
                    .await
                    .with_context(|| format!("Failed to seed participant {}", email))?;
            }
        }

        tx.commit().await.context("Failed to commit seed")?;
        info!("Seeded {} activities", INITIAL_ACTIVITIES.len());

        Ok(INITIAL_ACTIVITIES.len())
    }
}
