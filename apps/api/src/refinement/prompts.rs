//! Prompt templates for LLM-backed keyword refinement.

use crate::models::request::GiftRequest;
use crate::refinement::insights::MarketInsights;
use crate::refinement::strategies::RefinementStrategy;

pub const REFINEMENT_SYSTEM: &str = "당신은 네이버쇼핑 검색 최적화 전문가입니다. \
실제 상품 검색에 효과적인 키워드를 생성하는 것이 목표입니다. \
반드시 유효한 JSON 형식으로만 응답하세요.";

/// Builds the refinement prompt for one attempt. Failed keywords from earlier
/// attempts are listed so the model avoids repeating them.
pub fn refinement_prompt(
    original_keywords: &[String],
    failed_keywords: &[String],
    strategy: RefinementStrategy,
    request: &GiftRequest,
    insights: Option<&MarketInsights>,
    attempt: u32,
) -> String {
    let failed_section = if failed_keywords.is_empty() {
        "없음".to_string()
    } else {
        failed_keywords.join(", ")
    };

    let insights_section = insights
        .map(|i| {
            format!(
                "\n시장 인사이트:\n- 인기 상품: {}\n- 트렌드 키워드: {}\n- 평균 가격대: {}원\n",
                i.suggested_products.join(", "),
                i.trending_keywords.join(", "),
                i.average_price_krw
            )
        })
        .unwrap_or_default();

    format!(
        r#"네이버쇼핑에서 검색 결과가 부족하여 키워드를 개선해야 합니다. (시도 {attempt}회차)

받는 사람:
- 나이: {age}세
- 성별: {gender}
- 관계: {relationship}
- 관심사: {interests}
- 행사: {occasion}
- 예산: {budget_min} ~ {budget_max}

기존 키워드: {original}
실패한 키워드: {failed}

개선 전략: {guidance}
{insights}
위 전략에 따라 네이버쇼핑 검색에 효과적인 키워드 3~5개를 생성하세요.

다음 JSON 형식으로 응답하세요:
{{
  "refined_keywords": ["키워드1", "키워드2", "키워드3"],
  "search_query": "통합 검색어",
  "reasoning": "개선 이유",
  "expected_improvement": "기대 효과"
}}

{korean}"#,
        attempt = attempt,
        age = request.recipient_age,
        gender = request.recipient_gender,
        relationship = request.relationship,
        interests = request.interests.join(", "),
        occasion = request.occasion,
        budget_min = request.budget_min,
        budget_max = request.budget_max,
        original = original_keywords.join(", "),
        failed = failed_section,
        guidance = strategy.guidance(),
        insights = insights_section,
        korean = crate::llm_client::prompts::KOREAN_OUTPUT_INSTRUCTION,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
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

    #[test]
    fn test_prompt_includes_recipient_and_strategy() {
        let prompt = refinement_prompt(
            &["커피".to_string()],
            &[],
            RefinementStrategy::SynonymExpansion,
            &sample_request(),
            None,
            2,
        );
        assert!(prompt.contains("28세"));
        assert!(prompt.contains("동의어"));
        assert!(prompt.contains("시도 2회차"));
        assert!(prompt.contains("실패한 키워드: 없음"));
    }

    #[test]
    fn test_prompt_lists_failed_keywords() {
        let prompt = refinement_prompt(
            &["커피".to_string()],
            &["커피머신".to_string(), "원두".to_string()],
            RefinementStrategy::CategoryBroadening,
            &sample_request(),
            None,
            3,
        );
        assert!(prompt.contains("커피머신, 원두"));
    }

    #[test]
    fn test_prompt_embeds_market_insights() {
        let insights = crate::refinement::insights::market_insights(28, "여성");
        let prompt = refinement_prompt(
            &["커피".to_string()],
            &[],
            RefinementStrategy::MarketResearch,
            &sample_request(),
            Some(&insights),
            3,
        );
        assert!(prompt.contains("시장 인사이트"));
        assert!(prompt.contains("무선이어폰"));
    }
}
