use std::sync::Arc;

use crate::config::Config;
use crate::recommendation::{
    EnhancedRecommendationEngine, NaverRecommendationEngine, RecommendationEngine,
};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub basic: Arc<RecommendationEngine>,
    pub enhanced: Arc<EnhancedRecommendationEngine>,
    pub naver: Arc<NaverRecommendationEngine>,
}
