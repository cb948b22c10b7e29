use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Participant {
    pub id: i64,
    pub activity_id: i64,
    pub email: String,
}
