use crate::AppState;
use crate::handlers;
use axum::{
    Router,
    http::{HeaderValue, header},
    response::Redirect,
    routing::{delete, get, post},
};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

const LANDING_PAGE: &str = "/static/index.html";

pub fn build_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::temporary(LANDING_PAGE) }))
        .route("/health", get(handlers::health::health_check))
        .route("/activities", get(handlers::activities::list_activities))
        .route("/activities/{activity_name}/signup", post(handlers::activities::signup))
        .route("/activities/{activity_name}/unregister", delete(handlers::activities::unregister))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
}
