mod cache;
mod config;
mod currency;
mod errors;
mod llm_client;
mod models;
mod recommendation;
mod refinement;
mod routes;
mod scraping;
mod search;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::PipelineCache;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::recommendation::{
    EnhancedRecommendationEngine, NaverRecommendationEngine, RecommendationEngine,
};
use crate::refinement::QueryRefinementEngine;
use crate::routes::build_router;
use crate::scraping::apify::ApifyScrapingClient;
use crate::search::brave::BraveSearchClient;
use crate::search::naver::NaverShoppingClient;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (missing API keys are fine, bad values are not)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Gift Genie API v{}", env!("CARGO_PKG_VERSION"));
    if config.is_simulation_mode() {
        info!("Simulation mode active: one or more API keys are missing");
    }

    // LLM client (shared by every engine)
    let llm = config
        .effective_openai_key()
        .map(|key| LlmClient::new(key, config.api_timeout_secs));
    info!(
        "LLM client: {} (model: {})",
        if llm.is_some() { "live" } else { "simulation" },
        llm_client::MODEL
    );

    // Search and scraping clients, honoring the feature flags
    let brave_key = config
        .enable_brave_search
        .then(|| config.brave_search_api_key.clone())
        .flatten();
    let apify_key = config
        .enable_apify_scraping
        .then(|| config.apify_api_key.clone())
        .flatten();
    let brave = BraveSearchClient::new(brave_key);
    let apify = ApifyScrapingClient::new(apify_key);
    let naver_search = Arc::new(NaverShoppingClient::new(
        config.naver_client_id.clone(),
        config.naver_client_secret.clone(),
    ));
    info!(
        "Naver Shopping client: {}",
        if naver_search.enabled() { "live" } else { "simulation" }
    );

    // Engines
    let basic = Arc::new(RecommendationEngine::new(
        llm.clone(),
        config.max_recommendations,
    ));
    let enhanced = Arc::new(EnhancedRecommendationEngine::new(
        RecommendationEngine::new(llm.clone(), config.max_recommendations),
        brave,
        apify,
        PipelineCache::new(&config),
    ));
    let naver = Arc::new(NaverRecommendationEngine::new(
        RecommendationEngine::new(llm.clone(), config.max_recommendations),
        QueryRefinementEngine::new(llm),
        naver_search,
    ));

    let state = AppState {
        config: config.clone(),
        basic,
        enhanced,
        naver,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(&config.cors_origins));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// CORS layer from the configured origin list; `*` means fully permissive.
fn build_cors(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
