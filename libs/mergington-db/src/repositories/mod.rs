pub mod activity_repo;
pub mod participant_repo;
