//! Response DTOs: recommendations, product hits, and pipeline metrics.

use serde::{Deserialize, Serialize};

use crate::currency::Currency;

/// A single gift recommendation returned to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftRecommendation {
    pub title: String,
    pub description: String,
    pub category: String,
    pub estimated_price: i64,
    pub currency: Currency,
    /// Formatted price for display, e.g. `₩65,000` or `$50`.
    pub price_display: String,
    pub reasoning: String,
    #[serde(default)]
    pub purchase_link: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// 0.0..=1.0
    pub confidence_score: f32,
}

/// A product hit from the search/scraping stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSearchResult {
    pub title: String,
    pub url: String,
    pub description: String,
    pub domain: String,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub price_display: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// 0.0..=5.0
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub review_count: Option<u32>,
}

/// Per-stage timings and counters for the enhanced pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineMetrics {
    pub ai_generation_time: f64,
    pub search_execution_time: f64,
    pub scraping_execution_time: f64,
    pub integration_time: f64,
    pub total_time: f64,
    pub search_results_count: usize,
    pub product_details_count: usize,
    /// True when any stage ran against simulated data instead of a live API.
    pub cache_simulation: bool,
}

/// Basic AI-only recommendation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub request_id: String,
    pub recommendations: Vec<GiftRecommendation>,
    pub total_processing_time: f64,
    pub created_at: String,
    pub success: bool,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Enhanced response carrying search results and pipeline metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedRecommendationResponse {
    pub request_id: String,
    pub recommendations: Vec<GiftRecommendation>,
    pub search_results: Vec<ProductSearchResult>,
    pub pipeline_metrics: PipelineMetrics,
    pub total_processing_time: f64,
    pub created_at: String,
    pub success: bool,
    pub mcp_enabled: bool,
    pub simulation_mode: bool,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl EnhancedRecommendationResponse {
    /// Wraps a basic response in the enhanced envelope so the default
    /// endpoint always returns one shape.
    pub fn from_basic(basic: RecommendationResponse) -> Self {
        let metrics = PipelineMetrics {
            ai_generation_time: basic.total_processing_time,
            total_time: basic.total_processing_time,
            cache_simulation: true,
            ..Default::default()
        };
        EnhancedRecommendationResponse {
            request_id: basic.request_id,
            recommendations: basic.recommendations,
            search_results: vec![],
            pipeline_metrics: metrics,
            total_processing_time: basic.total_processing_time,
            created_at: basic.created_at,
            success: basic.success,
            mcp_enabled: false,
            simulation_mode: true,
            error_message: basic.error_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_round_trips_optional_fields() {
        let rec = GiftRecommendation {
            title: "커피 선물세트".to_string(),
            description: "프리미엄 원두 세트".to_string(),
            category: "식음료".to_string(),
            estimated_price: 65_000,
            currency: Currency::Krw,
            price_display: "₩65,000".to_string(),
            reasoning: "커피 애호가에게 적합".to_string(),
            purchase_link: None,
            image_url: None,
            confidence_score: 0.85,
        };
        let json = serde_json::to_string(&rec).unwrap();
        let back: GiftRecommendation = serde_json::from_str(&json).unwrap();
        assert_eq!(back.estimated_price, 65_000);
        assert!(back.purchase_link.is_none());
    }

    #[test]
    fn test_product_result_deserializes_without_optionals() {
        let json = serde_json::json!({
            "title": "Coffee Gift Set",
            "url": "https://amazon.com/dp/example1",
            "description": "Premium coffee gift.",
            "domain": "amazon.com"
        });
        let result: ProductSearchResult = serde_json::from_value(json).unwrap();
        assert!(result.price.is_none());
        assert!(result.rating.is_none());
    }

    #[test]
    fn test_from_basic_preserves_envelope_fields() {
        let basic = RecommendationResponse {
            request_id: "req_abc".to_string(),
            recommendations: vec![],
            total_processing_time: 2.5,
            created_at: "2025-07-26T10:00:00Z".to_string(),
            success: true,
            error_message: None,
        };
        let enhanced = EnhancedRecommendationResponse::from_basic(basic);
        assert_eq!(enhanced.request_id, "req_abc");
        assert!(!enhanced.mcp_enabled);
        assert!(enhanced.simulation_mode);
        assert!(enhanced.search_results.is_empty());
        assert!((enhanced.pipeline_metrics.ai_generation_time - 2.5).abs() < f64::EPSILON);
        assert!((enhanced.pipeline_metrics.total_time - 2.5).abs() < f64::EPSILON);
    }
}
