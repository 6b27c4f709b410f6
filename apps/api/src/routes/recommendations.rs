//! Recommendation endpoints.
//!
//! The default endpoint dispatches on `?mode=`; the mode-specific endpoints
//! call one engine directly. All POST handlers validate the request before
//! any engine runs.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::request::GiftRequest;
use crate::models::response::{
    EnhancedRecommendationResponse, PipelineMetrics, RecommendationResponse,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    #[serde(default)]
    mode: Option<String>,
}

/// POST /api/v1/recommendations?mode=basic|enhanced
/// Defaults to the enhanced pipeline; always returns the enhanced envelope.
pub async fn handle_recommendations(
    State(state): State<AppState>,
    Query(query): Query<RecommendationQuery>,
    Json(request): Json<GiftRequest>,
) -> Result<Json<EnhancedRecommendationResponse>, AppError> {
    request.validate()?;

    let use_basic =
        query.mode.as_deref() == Some("basic") || !state.config.enable_mcp_pipeline;

    let response = if use_basic {
        let basic = state.basic.generate_recommendations(&request).await;
        EnhancedRecommendationResponse::from_basic(basic)
    } else {
        state.enhanced.generate(&request).await
    };

    log_metrics(&response.request_id, &response.pipeline_metrics);
    Ok(Json(response))
}

/// POST /api/v1/recommendations/basic
pub async fn handle_basic(
    State(state): State<AppState>,
    Json(request): Json<GiftRequest>,
) -> Result<Json<RecommendationResponse>, AppError> {
    request.validate()?;
    Ok(Json(state.basic.generate_recommendations(&request).await))
}

/// POST /api/v1/recommendations/enhanced
pub async fn handle_enhanced(
    State(state): State<AppState>,
    Json(request): Json<GiftRequest>,
) -> Result<Json<EnhancedRecommendationResponse>, AppError> {
    request.validate()?;
    let response = state.enhanced.generate(&request).await;
    log_metrics(&response.request_id, &response.pipeline_metrics);
    Ok(Json(response))
}

/// POST /api/v1/recommendations/naver
pub async fn handle_naver(
    State(state): State<AppState>,
    Json(request): Json<GiftRequest>,
) -> Result<Json<EnhancedRecommendationResponse>, AppError> {
    request.validate()?;
    let response = state.naver.generate(&request).await;
    log_metrics(&response.request_id, &response.pipeline_metrics);
    Ok(Json(response))
}

/// GET /api/v1/recommendations/:request_id
/// Request history is not persisted; lookups always miss.
pub async fn handle_get_recommendation(
    Path(request_id): Path<String>,
) -> Result<Json<EnhancedRecommendationResponse>, AppError> {
    Err(AppError::NotFound(format!(
        "recommendation '{request_id}' not found (request history is not persisted)"
    )))
}

/// Records pipeline metrics off the response path, like a background task.
fn log_metrics(request_id: &str, metrics: &PipelineMetrics) {
    let request_id = request_id.to_string();
    let metrics = metrics.clone();
    tokio::spawn(async move {
        info!(
            request_id = %request_id,
            total_secs = metrics.total_time,
            ai_secs = metrics.ai_generation_time,
            search_secs = metrics.search_execution_time,
            scraping_secs = metrics.scraping_execution_time,
            search_results = metrics.search_results_count,
            simulation = metrics.cache_simulation,
            "pipeline metrics"
        );
    });
}
