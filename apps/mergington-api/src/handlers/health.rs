use crate::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let (status, database) = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::warn!("Health check could not reach the database: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    let body = json!({
        "status": if status.is_success() { "ok" } else { "degraded" },
        "database": database,
        "version": env!("CARGO_PKG_VERSION")
    });

    (status, Json(body))
}
