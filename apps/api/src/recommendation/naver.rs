//! Naver Shopping recommendation engine.
//!
//! Runs the AI stage, then drives the refinement loop against Naver
//! Shopping, and finally backs the AI recommendations with real Korean
//! products. All prices in the response are KRW.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::currency::{self, Currency};
use crate::models::request::GiftRequest;
use crate::models::response::{
    EnhancedRecommendationResponse, GiftRecommendation, PipelineMetrics, ProductSearchResult,
};
use crate::recommendation::engine::{convert_recommendation_currency, RecommendationEngine};
use crate::refinement::QueryRefinementEngine;
use crate::search::{NaverProduct, ProductSearch};

/// Confidence boost when a Naver product backs a recommendation.
const CONFIDENCE_BOOST: f32 = 0.15;
/// How many products are returned as raw search results.
const MAX_SEARCH_RESULTS: usize = 5;

pub struct NaverRecommendationEngine {
    ai: RecommendationEngine,
    refinement: QueryRefinementEngine,
    search: Arc<dyn ProductSearch>,
}

impl NaverRecommendationEngine {
    pub fn new(
        ai: RecommendationEngine,
        refinement: QueryRefinementEngine,
        search: Arc<dyn ProductSearch>,
    ) -> Self {
        Self {
            ai,
            refinement,
            search,
        }
    }

    pub async fn generate(&self, request: &GiftRequest) -> EnhancedRecommendationResponse {
        let total_start = Instant::now();
        let request_id = format!("naver_req_{}", Uuid::new_v4().simple());

        // Stage 1: AI recommendations, re-priced to KRW
        let stage_start = Instant::now();
        let ai_response = self.ai.generate_recommendations(request).await;
        let recommendations: Vec<GiftRecommendation> = ai_response
            .recommendations
            .into_iter()
            .map(|rec| convert_recommendation_currency(rec, Currency::Krw))
            .collect();
        let ai_generation_time = stage_start.elapsed().as_secs_f64();

        // Stage 2: refinement-driven product search
        let keywords = initial_keywords(request);
        let (band_min_krw, band_max_krw) = budget_band_krw(request);
        let (mut products, session) = self
            .refinement
            .refine_search_with_retries(&keywords, request, self.search.as_ref(), band_max_krw)
            .await;
        products.retain(|p| p.lprice >= band_min_krw);

        info!(
            request_id = %request_id,
            session_id = %session.session_id,
            attempts = session.attempts.len(),
            products = products.len(),
            "naver search complete"
        );

        // Stage 3: back recommendations with real products
        let stage_start = Instant::now();
        let recommendations = integrate_naver_products(recommendations, &products);
        let integration_time = stage_start.elapsed().as_secs_f64();

        let search_results: Vec<ProductSearchResult> = products
            .iter()
            .take(MAX_SEARCH_RESULTS)
            .map(to_search_result)
            .collect();

        let simulation_mode = self.ai.simulation_mode();
        let total_time = total_start.elapsed().as_secs_f64();

        EnhancedRecommendationResponse {
            request_id,
            recommendations,
            pipeline_metrics: PipelineMetrics {
                ai_generation_time,
                search_execution_time: session.total_processing_time_secs,
                scraping_execution_time: 0.0,
                integration_time,
                total_time,
                search_results_count: products.len(),
                product_details_count: search_results.len(),
                cache_simulation: simulation_mode,
            },
            search_results,
            total_processing_time: total_time,
            created_at: Utc::now().to_rfc3339(),
            success: true,
            mcp_enabled: false,
            simulation_mode,
            error_message: None,
        }
    }
}

/// Seed keywords: the first two interests plus the occasion.
fn initial_keywords(request: &GiftRequest) -> Vec<String> {
    let mut keywords: Vec<String> = request.trimmed_interests().into_iter().take(2).collect();
    keywords.push(request.occasion.trim().to_string());
    keywords
}

/// KRW price band: 80% of the minimum up to 120% of the maximum, so
/// near-miss products still qualify.
fn budget_band_krw(request: &GiftRequest) -> (i64, i64) {
    let min_krw = currency::convert(request.budget_min, request.currency, Currency::Krw);
    let max_krw = request.budget_max_krw();
    (min_krw * 8 / 10, max_krw * 12 / 10)
}

/// Backs each leading recommendation with a matching product: real price,
/// purchase link, image, mall line, and a confidence boost.
fn integrate_naver_products(
    recommendations: Vec<GiftRecommendation>,
    products: &[NaverProduct],
) -> Vec<GiftRecommendation> {
    recommendations
        .into_iter()
        .enumerate()
        .map(|(i, mut rec)| {
            let Some(product) = products.get(i) else {
                return rec;
            };

            rec.estimated_price = product.lprice;
            rec.currency = Currency::Krw;
            rec.price_display = currency::format_amount(product.lprice, Currency::Krw);
            rec.purchase_link = Some(product.link.clone());
            if !product.image.is_empty() {
                rec.image_url = Some(product.image.clone());
            }
            rec.description = format!(
                "{}\n\n네이버쇼핑 최저가 {} ({})",
                rec.description,
                rec.price_display,
                if product.mall_name.is_empty() {
                    "네이버쇼핑"
                } else {
                    &product.mall_name
                }
            );
            rec.confidence_score = (rec.confidence_score + CONFIDENCE_BOOST).min(1.0);
            rec
        })
        .collect()
}

fn to_search_result(product: &NaverProduct) -> ProductSearchResult {
    ProductSearchResult {
        title: product.title.clone(),
        url: product.link.clone(),
        description: if product.category3.is_empty() {
            product.mall_name.clone()
        } else {
            format!("{} | {}", product.mall_name, product.category3)
        },
        domain: "shopping.naver.com".to_string(),
        price: Some(product.lprice),
        currency: Some(Currency::Krw),
        price_display: Some(currency::format_amount(product.lprice, Currency::Krw)),
        image_url: (!product.image.is_empty()).then(|| product.image.clone()),
        rating: None,
        review_count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use async_trait::async_trait;

    fn sample_request() -> GiftRequest {
        GiftRequest {
            recipient_age: 28,
            recipient_gender: "여성".to_string(),
            relationship: "친구".to_string(),
            budget_min: 50,
            budget_max: 150,
            currency: Currency::Usd,
            interests: vec!["독서".to_string(), "커피".to_string(), "여행".to_string()],
            occasion: "생일".to_string(),
            personal_style: None,
            restrictions: None,
        }
    }

    fn make_product(n: usize, lprice: i64) -> NaverProduct {
        NaverProduct {
            title: format!("커피 선물세트 {n}"),
            link: format!("https://shopping.naver.com/p/{n}"),
            image: format!("https://shopping-phinf.pstatic.net/{n}.jpg"),
            lprice,
            hprice: lprice,
            mall_name: "커피몰".to_string(),
            product_id: format!("{n}"),
            product_type: 1,
            brand: String::new(),
            maker: String::new(),
            category1: "식품".to_string(),
            category2: "음료".to_string(),
            category3: "커피".to_string(),
            category4: String::new(),
        }
    }

    struct FixedSearch {
        products: Vec<NaverProduct>,
    }

    #[async_trait]
    impl ProductSearch for FixedSearch {
        async fn search(
            &self,
            _keywords: &[String],
            _budget_max_krw: i64,
        ) -> Result<Vec<NaverProduct>, AppError> {
            Ok(self.products.clone())
        }
    }

    fn engine_with(products: Vec<NaverProduct>) -> NaverRecommendationEngine {
        NaverRecommendationEngine::new(
            RecommendationEngine::new(None, 5),
            QueryRefinementEngine::new(None),
            Arc::new(FixedSearch { products }),
        )
    }

    #[test]
    fn test_initial_keywords_take_two_interests_plus_occasion() {
        let keywords = initial_keywords(&sample_request());
        assert_eq!(keywords, vec!["독서", "커피", "생일"]);
    }

    #[test]
    fn test_budget_band_widens_usd_budget() {
        // $50..$150 -> KRW 65,000..195,000 -> band 52,000..234,000
        let (min, max) = budget_band_krw(&sample_request());
        assert_eq!(min, 52_000);
        assert_eq!(max, 234_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_backs_recommendations_with_krw_products() {
        let engine = engine_with(vec![
            make_product(1, 89_000),
            make_product(2, 120_000),
            make_product(3, 65_000),
        ]);
        let response = engine.generate(&sample_request()).await;

        assert!(response.success);
        assert!(!response.mcp_enabled);
        assert!(response.request_id.starts_with("naver_req_"));
        assert_eq!(response.search_results.len(), 3);
        assert_eq!(response.search_results[0].domain, "shopping.naver.com");

        let first = &response.recommendations[0];
        assert_eq!(first.currency, Currency::Krw);
        assert_eq!(first.estimated_price, 89_000);
        assert_eq!(first.price_display, "₩89,000");
        assert_eq!(
            first.purchase_link.as_deref(),
            Some("https://shopping.naver.com/p/1")
        );
        assert!(first.description.contains("네이버쇼핑 최저가"));
        // Mock confidence 0.85 + 0.15 boost
        assert!((first.confidence_score - 1.0).abs() < 1e-6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_prices_are_krw_even_without_products() {
        let engine = engine_with(vec![]);
        let response = engine.generate(&sample_request()).await;

        assert!(response.search_results.is_empty());
        for rec in &response.recommendations {
            assert_eq!(rec.currency, Currency::Krw);
            assert!(rec.price_display.starts_with('₩'));
            assert!(rec.purchase_link.is_none());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_band_filter_drops_too_cheap_products() {
        // Band minimum is 52,000 for a $50..$150 budget
        let engine = engine_with(vec![
            make_product(1, 30_000),
            make_product(2, 89_000),
            make_product(3, 150_000),
        ]);
        let response = engine.generate(&sample_request()).await;

        assert_eq!(response.search_results.len(), 2);
        assert!(response
            .search_results
            .iter()
            .all(|r| r.price.unwrap() >= 52_000));
    }

    #[test]
    fn test_search_result_conversion() {
        let result = to_search_result(&make_product(7, 99_000));
        assert_eq!(result.price, Some(99_000));
        assert_eq!(result.price_display.as_deref(), Some("₩99,000"));
        assert_eq!(result.description, "커피몰 | 커피");
        assert!(result.image_url.is_some());
    }
}
