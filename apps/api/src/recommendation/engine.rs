//! AI-only recommendation engine.
//!
//! Generates gift recommendations from the LLM, parsing its JSON output
//! tolerantly. Any failure (no key, LLM error, unparseable output) degrades
//! to curated mock recommendations; the endpoint never fails outright.

use std::time::Instant;

use chrono::Utc;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::currency::{self, Currency};
use crate::llm_client::LlmClient;
use crate::models::request::GiftRequest;
use crate::models::response::{GiftRecommendation, RecommendationResponse};
use crate::recommendation::prompts;

/// Keys under which models have been observed to nest the recommendation list.
const LIST_KEYS: &[&str] = &["recommendations", "gift_recommendations", "gifts", "items"];

const DEFAULT_CONFIDENCE: f32 = 0.75;

#[derive(Clone)]
pub struct RecommendationEngine {
    llm: Option<LlmClient>,
    max_recommendations: usize,
}

impl RecommendationEngine {
    pub fn new(llm: Option<LlmClient>, max_recommendations: usize) -> Self {
        Self {
            llm,
            max_recommendations,
        }
    }

    pub fn simulation_mode(&self) -> bool {
        self.llm.is_none()
    }

    /// Generates recommendations for a validated request.
    pub async fn generate_recommendations(&self, request: &GiftRequest) -> RecommendationResponse {
        let start = Instant::now();
        let request_id = format!("req_{}", Uuid::new_v4().simple());

        let recommendations = match &self.llm {
            Some(llm) => match self.generate_with_llm(llm, request).await {
                Some(recs) => recs,
                None => mock_recommendations(request),
            },
            None => mock_recommendations(request),
        };

        let mut recommendations = recommendations;
        recommendations.truncate(self.max_recommendations);

        RecommendationResponse {
            request_id,
            recommendations,
            total_processing_time: start.elapsed().as_secs_f64(),
            created_at: Utc::now().to_rfc3339(),
            success: true,
            error_message: None,
        }
    }

    async fn generate_with_llm(
        &self,
        llm: &LlmClient,
        request: &GiftRequest,
    ) -> Option<Vec<GiftRecommendation>> {
        let prompt = prompts::recommendation_prompt(request, self.max_recommendations);

        let value: Value = match llm.call_json(&prompt, prompts::CONSULTANT_SYSTEM).await {
            Ok(v) => v,
            Err(e) => {
                warn!("AI recommendation call failed, using mock data: {e}");
                return None;
            }
        };

        let recommendations = parse_recommendations(&value, request);
        if recommendations.is_empty() {
            warn!("AI response contained no usable recommendations");
            return None;
        }
        Some(recommendations)
    }
}

/// Tolerant parse of the LLM response: accepts the documented envelope,
/// several key variants, or a bare array. Items missing a title are dropped;
/// other fields get sensible defaults.
fn parse_recommendations(value: &Value, request: &GiftRequest) -> Vec<GiftRecommendation> {
    let items = match extract_items(value) {
        Some(items) => items,
        None => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| parse_item(item, request))
        .collect()
}

fn extract_items(value: &Value) -> Option<&Vec<Value>> {
    if let Some(array) = value.as_array() {
        return Some(array);
    }
    LIST_KEYS
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_array))
}

fn parse_item(item: &Value, request: &GiftRequest) -> Option<GiftRecommendation> {
    let title = item
        .get("title")
        .or_else(|| item.get("name"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())?
        .to_string();

    let price = item
        .get("estimated_price")
        .or_else(|| item.get("price"))
        .and_then(value_as_i64)
        .unwrap_or((request.budget_min + request.budget_max) / 2)
        .clamp(request.budget_min, request.budget_max);

    let confidence = item
        .get("confidence_score")
        .or_else(|| item.get("confidence"))
        .and_then(Value::as_f64)
        .map(|c| c as f32)
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 1.0);

    Some(GiftRecommendation {
        title,
        description: string_field(item, "description"),
        category: {
            let category = string_field(item, "category");
            if category.is_empty() {
                "선물".to_string()
            } else {
                category
            }
        },
        estimated_price: price,
        currency: request.currency,
        price_display: currency::format_amount(price, request.currency),
        reasoning: string_field(item, "reasoning"),
        purchase_link: None,
        image_url: None,
        confidence_score: confidence,
    })
}

fn string_field(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Numbers may arrive as integers, floats, or digit strings like "85000원".
fn value_as_i64(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    if let Some(f) = value.as_f64() {
        return Some(f as i64);
    }
    let digits: String = value.as_str()?.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Curated recommendations used when no LLM is available.
fn mock_recommendations(request: &GiftRequest) -> Vec<GiftRecommendation> {
    let interests = request.trimmed_interests();
    let primary = interests.first().map(String::as_str).unwrap_or("취미");
    let secondary = interests.get(1).map(String::as_str).unwrap_or(primary);
    let currency = request.currency;
    let (min, max) = (request.budget_min, request.budget_max);

    let picks = [
        (
            format!("프리미엄 {primary} 선물세트"),
            format!("{primary}를 좋아하는 분을 위한 엄선된 구성의 선물세트입니다."),
            "프리미엄 선물".to_string(),
            min + (max - min) * 4 / 5,
            format!("{}을(를) 위한 {}에 어울리는 정성스러운 선택입니다.", request.relationship, request.occasion),
            0.85,
        ),
        (
            format!("{secondary} 입문 키트"),
            format!("{secondary}에 관심 있는 분이 바로 시작할 수 있는 실용적인 구성입니다."),
            "취미용품".to_string(),
            min + (max - min) / 2,
            "관심사에 맞춰 실제로 사용할 수 있는 선물입니다.".to_string(),
            0.8,
        ),
        (
            format!("감성 {primary} 소품"),
            "일상에서 자주 쓰게 되는 부담 없는 감성 소품입니다.".to_string(),
            "홈&리빙".to_string(),
            min + (max - min) / 5,
            "예산 부담 없이 마음을 전할 수 있습니다.".to_string(),
            0.75,
        ),
    ];

    picks
        .into_iter()
        .map(
            |(title, description, category, price, reasoning, confidence)| GiftRecommendation {
                title,
                description,
                category,
                estimated_price: price,
                currency,
                price_display: currency::format_amount(price, currency),
                reasoning,
                purchase_link: None,
                image_url: None,
                confidence_score: confidence,
            },
        )
        .collect()
}

/// Re-prices a recommendation in another currency, keeping the display in sync.
pub(crate) fn convert_recommendation_currency(
    mut rec: GiftRecommendation,
    target: Currency,
) -> GiftRecommendation {
    if rec.currency != target {
        rec.estimated_price = currency::convert(rec.estimated_price, rec.currency, target);
        rec.currency = target;
        rec.price_display = currency::format_amount(rec.estimated_price, target);
    }
    rec
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[tokio::test]
    async fn test_simulation_mode_returns_mocks() {
        let engine = RecommendationEngine::new(None, 5);
        assert!(engine.simulation_mode());
        let response = engine.generate_recommendations(&sample_request()).await;
        assert!(response.success);
        assert_eq!(response.recommendations.len(), 3);
        assert!(response.request_id.starts_with("req_"));
        assert!(response.recommendations[0].title.contains("독서"));
    }

    #[tokio::test]
    async fn test_max_recommendations_truncates() {
        let engine = RecommendationEngine::new(None, 2);
        let response = engine.generate_recommendations(&sample_request()).await;
        assert_eq!(response.recommendations.len(), 2);
    }

    #[test]
    fn test_mock_prices_stay_in_budget() {
        let request = sample_request();
        for rec in mock_recommendations(&request) {
            assert!(rec.estimated_price >= request.budget_min);
            assert!(rec.estimated_price <= request.budget_max);
            assert_eq!(rec.currency, Currency::Usd);
        }
    }

    #[test]
    fn test_parse_documented_envelope() {
        let value = serde_json::json!({
            "recommendations": [
                {
                    "title": "커피 선물세트",
                    "description": "프리미엄 원두",
                    "category": "식음료",
                    "estimated_price": 80,
                    "reasoning": "커피 애호가에게 적합",
                    "confidence_score": 0.9
                }
            ]
        });
        let recs = parse_recommendations(&value, &sample_request());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].estimated_price, 80);
        assert_eq!(recs[0].price_display, "$80");
        assert!((recs[0].confidence_score - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_alternate_keys_and_bare_array() {
        let request = sample_request();
        for key in ["gift_recommendations", "gifts", "items"] {
            let value = serde_json::json!({ key: [{"title": "선물"}] });
            assert_eq!(parse_recommendations(&value, &request).len(), 1);
        }
        let bare = serde_json::json!([{"title": "선물"}]);
        assert_eq!(parse_recommendations(&bare, &request).len(), 1);
    }

    #[test]
    fn test_parse_defaults_for_missing_fields() {
        let value = serde_json::json!({"recommendations": [{"title": "선물"}]});
        let recs = parse_recommendations(&value, &sample_request());
        let rec = &recs[0];
        // Mid-budget default
        assert_eq!(rec.estimated_price, 100);
        assert_eq!(rec.category, "선물");
        assert!((rec.confidence_score - DEFAULT_CONFIDENCE).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_drops_untitled_items() {
        let value = serde_json::json!({
            "recommendations": [
                {"description": "제목 없음"},
                {"title": "  "},
                {"title": "유효한 선물"}
            ]
        });
        let recs = parse_recommendations(&value, &sample_request());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].title, "유효한 선물");
    }

    #[test]
    fn test_parse_clamps_out_of_budget_price() {
        let value = serde_json::json!({
            "recommendations": [{"title": "명품 시계", "estimated_price": 5000}]
        });
        let recs = parse_recommendations(&value, &sample_request());
        assert_eq!(recs[0].estimated_price, 150);
    }

    #[test]
    fn test_value_as_i64_variants() {
        assert_eq!(value_as_i64(&serde_json::json!(85)), Some(85));
        assert_eq!(value_as_i64(&serde_json::json!(85.9)), Some(85));
        assert_eq!(value_as_i64(&serde_json::json!("85000원")), Some(85_000));
        assert_eq!(value_as_i64(&serde_json::json!("가격 미정")), None);
    }

    #[test]
    fn test_parse_unrecognized_shape_yields_empty() {
        let value = serde_json::json!({"message": "죄송합니다"});
        assert!(parse_recommendations(&value, &sample_request()).is_empty());
    }

    #[test]
    fn test_currency_conversion_helper() {
        let value = serde_json::json!({"recommendations": [{"title": "선물", "estimated_price": 100}]});
        let rec = parse_recommendations(&value, &sample_request()).remove(0);
        let converted = convert_recommendation_currency(rec, Currency::Krw);
        assert_eq!(converted.estimated_price, 130_000);
        assert_eq!(converted.price_display, "₩130,000");
    }
}
