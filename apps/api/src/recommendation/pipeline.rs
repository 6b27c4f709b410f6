//! Search-enhanced recommendation pipeline.
//!
//! Four stages: AI generation, web product search, detail scraping, and
//! integration of real products into the AI recommendations. Every stage
//! consults its cache tier first and degrades to simulated data when the
//! backing API is unavailable.

use std::time::Instant;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::cache::{cache_key, PipelineCache};
use crate::models::request::GiftRequest;
use crate::models::response::{
    EnhancedRecommendationResponse, GiftRecommendation, PipelineMetrics, ProductSearchResult,
};
use crate::recommendation::engine::RecommendationEngine;
use crate::recommendation::keywords;
use crate::scraping::apify::ApifyScrapingClient;
use crate::search::brave::BraveSearchClient;

/// Confidence boost applied when a real product backs a recommendation.
const CONFIDENCE_BOOST: f32 = 0.1;
/// How many search results get folded into recommendations.
const MAX_INTEGRATED: usize = 3;

pub struct EnhancedRecommendationEngine {
    ai: RecommendationEngine,
    search: BraveSearchClient,
    scraper: ApifyScrapingClient,
    cache: PipelineCache,
}

impl EnhancedRecommendationEngine {
    pub fn new(
        ai: RecommendationEngine,
        search: BraveSearchClient,
        scraper: ApifyScrapingClient,
        cache: PipelineCache,
    ) -> Self {
        Self {
            ai,
            search,
            scraper,
            cache,
        }
    }

    pub async fn generate(&self, request: &GiftRequest) -> EnhancedRecommendationResponse {
        let total_start = Instant::now();
        let request_id = format!("enhanced_req_{}", Uuid::new_v4().simple());

        // Stage 1: AI recommendations
        let stage_start = Instant::now();
        let ai_key = cache_key("ai", request);
        let recommendations = match self.cache.get_ai(&ai_key).await {
            Some(cached) => {
                info!(request_id = %request_id, "AI cache hit");
                cached
            }
            None => {
                let response = self.ai.generate_recommendations(request).await;
                self.cache
                    .set_ai(ai_key, response.recommendations.clone())
                    .await;
                response.recommendations
            }
        };
        let ai_generation_time = stage_start.elapsed().as_secs_f64();

        // Stage 2: product search
        let stage_start = Instant::now();
        let search_terms = keywords::search_keywords(&recommendations, &request.trimmed_interests());
        let budget_max_usd = request.budget_max_usd();
        let search_key = cache_key("search", &(&search_terms, budget_max_usd));
        let search_results = match self.cache.get_search(&search_key).await {
            Some(cached) => {
                info!(request_id = %request_id, "search cache hit");
                cached
            }
            None => {
                let results = self.search.search_products(&search_terms, budget_max_usd).await;
                self.cache.set_search(search_key, results.clone()).await;
                results
            }
        };
        let search_execution_time = stage_start.elapsed().as_secs_f64();

        // Stage 3: product detail enrichment, cached per URL
        let stage_start = Instant::now();
        let search_results = self.enrich_products(search_results).await;
        let scraping_execution_time = stage_start.elapsed().as_secs_f64();

        // Stage 4: fold real products into the recommendations
        let stage_start = Instant::now();
        let recommendations = integrate_products(recommendations, &search_results);
        let integration_time = stage_start.elapsed().as_secs_f64();

        let simulation_mode = self.ai.simulation_mode() || !self.search.enabled();
        let total_time = total_start.elapsed().as_secs_f64();

        EnhancedRecommendationResponse {
            request_id,
            pipeline_metrics: PipelineMetrics {
                ai_generation_time,
                search_execution_time,
                scraping_execution_time,
                integration_time,
                total_time,
                search_results_count: search_results.len(),
                product_details_count: search_results
                    .iter()
                    .filter(|r| r.rating.is_some())
                    .count(),
                cache_simulation: simulation_mode,
            },
            recommendations,
            search_results,
            total_processing_time: total_time,
            created_at: Utc::now().to_rfc3339(),
            success: true,
            mcp_enabled: true,
            simulation_mode,
            error_message: None,
        }
    }

    async fn enrich_products(
        &self,
        results: Vec<ProductSearchResult>,
    ) -> Vec<ProductSearchResult> {
        let mut enriched = Vec::with_capacity(results.len());
        let mut misses = Vec::new();

        for result in results {
            match self.cache.get_product(&result.url).await {
                Some(cached) => enriched.push(cached),
                None => misses.push(result),
            }
        }

        for product in self.scraper.scrape_product_details(misses).await {
            self.cache
                .set_product(product.url.clone(), product.clone())
                .await;
            enriched.push(product);
        }

        enriched
    }
}

/// Attaches the top search results to the leading recommendations:
/// purchase link, image, a rating line in the description, and a
/// confidence boost for being backed by a real product.
fn integrate_products(
    recommendations: Vec<GiftRecommendation>,
    search_results: &[ProductSearchResult],
) -> Vec<GiftRecommendation> {
    recommendations
        .into_iter()
        .enumerate()
        .map(|(i, mut rec)| {
            let Some(product) = search_results.get(i).filter(|_| i < MAX_INTEGRATED) else {
                return rec;
            };

            rec.purchase_link = Some(product.url.clone());
            if rec.image_url.is_none() {
                rec.image_url = product.image_url.clone();
            }
            if let (Some(rating), Some(reviews)) = (product.rating, product.review_count) {
                rec.description = format!(
                    "{}\n\n실제 상품 정보 ({}): ⭐{rating} · 리뷰 {reviews}개",
                    rec.description, product.domain
                );
            }
            rec.confidence_score = (rec.confidence_score + CONFIDENCE_BOOST).min(1.0);
            rec
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::currency::Currency;

    fn sample_request() -> GiftRequest {
        GiftRequest {
            recipient_age: 28,
            recipient_gender: "여성".to_string(),
            relationship: "친구".to_string(),
            budget_min: 50,
            budget_max: 150,
            currency: Currency::Usd,
            interests: vec!["독서".to_string(), "커피".to_string()],
            occasion: "생일".to_string(),
            personal_style: None,
            restrictions: None,
        }
    }

    fn simulated_engine() -> EnhancedRecommendationEngine {
        let config = Config::from_env().expect("default config");
        EnhancedRecommendationEngine::new(
            RecommendationEngine::new(None, 5),
            BraveSearchClient::new(None),
            ApifyScrapingClient::new(None),
            PipelineCache::new(&config),
        )
    }

    #[tokio::test]
    async fn test_full_pipeline_in_simulation_mode() {
        let engine = simulated_engine();
        let response = engine.generate(&sample_request()).await;

        assert!(response.success);
        assert!(response.simulation_mode);
        assert!(response.mcp_enabled);
        assert!(response.request_id.starts_with("enhanced_req_"));
        // Simulated search yields 3 results, all enriched
        assert_eq!(response.search_results.len(), 3);
        assert!(response.search_results.iter().all(|r| r.rating.is_some()));
        assert_eq!(response.pipeline_metrics.search_results_count, 3);
        assert_eq!(response.pipeline_metrics.product_details_count, 3);
    }

    #[tokio::test]
    async fn test_integrated_recommendations_carry_links_and_boost() {
        let engine = simulated_engine();
        let response = engine.generate(&sample_request()).await;

        for rec in response.recommendations.iter().take(3) {
            assert!(rec.purchase_link.is_some());
            assert!(rec.description.contains("실제 상품 정보"));
        }
        // Mock confidence 0.85 + 0.1 boost
        assert!((response.recommendations[0].confidence_score - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_integration_leaves_unmatched_recommendations_alone() {
        let recs = vec![
            GiftRecommendation {
                title: "선물 A".to_string(),
                description: "설명".to_string(),
                category: "선물".to_string(),
                estimated_price: 100,
                currency: Currency::Usd,
                price_display: "$100".to_string(),
                reasoning: String::new(),
                purchase_link: None,
                image_url: None,
                confidence_score: 0.8,
            };
            2
        ];
        let products = vec![ProductSearchResult {
            title: "상품".to_string(),
            url: "https://amazon.com/dp/1".to_string(),
            description: String::new(),
            domain: "amazon.com".to_string(),
            price: Some(90),
            currency: Some(Currency::Usd),
            price_display: Some("$90".to_string()),
            image_url: Some("https://img".to_string()),
            rating: Some(4.5),
            review_count: Some(120),
        }];

        let integrated = integrate_products(recs, &products);
        assert!(integrated[0].purchase_link.is_some());
        assert_eq!(integrated[0].image_url.as_deref(), Some("https://img"));
        assert!(integrated[1].purchase_link.is_none());
        assert!((integrated[1].confidence_score - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_confidence_boost_caps_at_one() {
        let rec = GiftRecommendation {
            title: "선물".to_string(),
            description: String::new(),
            category: "선물".to_string(),
            estimated_price: 100,
            currency: Currency::Usd,
            price_display: "$100".to_string(),
            reasoning: String::new(),
            purchase_link: None,
            image_url: None,
            confidence_score: 0.97,
        };
        let product = ProductSearchResult {
            title: "상품".to_string(),
            url: "https://amazon.com/dp/1".to_string(),
            description: String::new(),
            domain: "amazon.com".to_string(),
            price: None,
            currency: None,
            price_display: None,
            image_url: None,
            rating: None,
            review_count: None,
        };
        let integrated = integrate_products(vec![rec], &[product]);
        assert!((integrated[0].confidence_score - 1.0).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_repeat_request_hits_caches() {
        let engine = simulated_engine();
        let request = sample_request();
        let first = engine.generate(&request).await;
        let second = engine.generate(&request).await;
        // Cached AI stage returns the same recommendations
        assert_eq!(
            first.recommendations.iter().map(|r| &r.title).collect::<Vec<_>>(),
            second.recommendations.iter().map(|r| &r.title).collect::<Vec<_>>()
        );
    }
}
