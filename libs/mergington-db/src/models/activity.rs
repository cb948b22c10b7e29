use serde::{Serialize, Serializer};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Activity {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub schedule: String,
    pub max_participants: i64,
}

/// Public view of one activity, keyed by name in [`ActivityCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityDetails {
    pub description: String,
    pub schedule: String,
    pub max_participants: i64,
    pub participants: Vec<String>,
}

impl ActivityDetails {
    pub fn new(activity: &Activity, participants: Vec<String>) -> Self {
        Self {
            description: activity.description.clone(),
            schedule: activity.schedule.clone(),
            max_participants: activity.max_participants,
            participants,
        }
    }
}

/// Activities in store order. Serializes as a JSON object `{name: details}`
/// without re-sorting the keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityCatalog(pub Vec<(String, ActivityDetails)>);

impl ActivityCatalog {
    pub fn get(&self, name: &str) -> Option<&ActivityDetails> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ActivityCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, details)| (name, details)))
    }
}
