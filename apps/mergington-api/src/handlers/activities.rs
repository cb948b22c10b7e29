use crate::AppState;
use crate::error::AppError;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use mergington_db::models::activity::ActivityCatalog;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct EmailParams {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn list_activities(State(state): State<AppState>) -> Result<Json<ActivityCatalog>, AppError> {
    Ok(Json(state.activity_service.list_activities().await?))
}

pub async fn signup(
    State(state): State<AppState>,
    Path(activity_name): Path<String>,
    Query(params): Query<EmailParams>,
) -> Result<Json<MessageResponse>, AppError> {
    state.signup_service.signup(&activity_name, &params.email).await?;

    Ok(Json(MessageResponse {
        message: format!("Signed up {} for {}", params.email, activity_name),
    }))
}

pub async fn unregister(
    State(state): State<AppState>,
    Path(activity_name): Path<String>,
    Query(params): Query<EmailParams>,
) -> Result<Json<MessageResponse>, AppError> {
    state.signup_service.unregister(&activity_name, &params.email).await?;

    Ok(Json(MessageResponse {
        message: format!("Unregistered {} from {}", params.email, activity_name),
    }))
}
