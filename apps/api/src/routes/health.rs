use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "gift-genie-api"
    }))
}

/// GET /api/v1/health
pub async fn api_health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "environment": state.config.environment,
        "timestamp": Utc::now().to_rfc3339()
    }))
}

/// GET /api/v1/health/detailed
/// Per-service configuration status, so deployments can tell at a glance
/// which integrations run live and which are simulated.
pub async fn detailed_health_handler(State(state): State<AppState>) -> Json<Value> {
    let config = &state.config;

    let service_status = |configured: bool| if configured { "configured" } else { "simulation" };

    Json(json!({
        "status": "healthy",
        "environment": config.environment,
        "timestamp": Utc::now().to_rfc3339(),
        "simulation_mode": config.is_simulation_mode(),
        "services": {
            "openai": service_status(config.openai_configured()),
            "brave_search": service_status(config.brave_search_api_key.is_some()),
            "apify": service_status(config.apify_api_key.is_some()),
            "naver_shopping": service_status(config.naver_configured()),
        },
        "features": {
            "mcp_pipeline": config.enable_mcp_pipeline,
            "brave_search": config.enable_brave_search,
            "apify_scraping": config.enable_apify_scraping,
        },
        "limits": {
            "max_recommendations": config.max_recommendations,
            "rate_limit_per_minute": config.rate_limit_per_minute,
        }
    }))
}
