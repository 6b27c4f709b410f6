pub mod health;
pub mod recommendations;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/health", get(health::api_health_handler))
        .route("/api/v1/health/detailed", get(health::detailed_health_handler))
        .route(
            "/api/v1/recommendations",
            post(recommendations::handle_recommendations),
        )
        .route(
            "/api/v1/recommendations/basic",
            post(recommendations::handle_basic),
        )
        .route(
            "/api/v1/recommendations/enhanced",
            post(recommendations::handle_enhanced),
        )
        .route(
            "/api/v1/recommendations/naver",
            post(recommendations::handle_naver),
        )
        .route(
            "/api/v1/recommendations/:request_id",
            get(recommendations::handle_get_recommendation),
        )
        .with_state(state)
}
