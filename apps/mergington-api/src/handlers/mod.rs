pub mod activities;
pub mod health;
