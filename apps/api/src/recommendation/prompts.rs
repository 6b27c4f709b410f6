//! Prompt templates for AI gift recommendation.

use crate::currency;
use crate::models::request::GiftRequest;

pub const CONSULTANT_SYSTEM: &str = "당신은 전문 선물 추천 컨설턴트입니다. \
받는 사람의 특성과 예산을 깊이 고려하여 실용적이고 감동적인 선물을 추천합니다. \
모든 텍스트는 한글로 작성하고, 반드시 유효한 JSON 형식으로만 응답하세요.";

/// Builds the recommendation prompt from the request profile.
pub fn recommendation_prompt(request: &GiftRequest, max_recommendations: usize) -> String {
    let style_section = request
        .personal_style
        .as_deref()
        .map(|s| format!("- 개인 스타일: {s}\n"))
        .unwrap_or_default();

    let restrictions_section = request
        .restrictions
        .as_ref()
        .filter(|r| !r.is_empty())
        .map(|r| format!("- 제외 조건: {}\n", r.join(", ")))
        .unwrap_or_default();

    format!(
        r#"다음 조건에 맞는 선물 {max_recommendations}개를 추천해주세요.

받는 사람:
- 나이: {age}세
- 성별: {gender}
- 관계: {relationship}
- 관심사: {interests}
- 행사: {occasion}
{style}{restrictions}
예산: {budget_min} ~ {budget_max}

각 추천마다 제목, 설명, 카테고리, 예상 가격(예산 범위 내 숫자), 추천 이유, 확신도(0.0~1.0)를 포함하세요.

다음 JSON 형식으로 응답하세요:
{{
  "recommendations": [
    {{
      "title": "선물 이름",
      "description": "선물에 대한 상세 설명",
      "category": "카테고리",
      "estimated_price": 숫자,
      "reasoning": "이 선물을 추천하는 이유",
      "confidence_score": 0.85
    }}
  ]
}}

{korean}"#,
        max_recommendations = max_recommendations,
        age = request.recipient_age,
        gender = request.recipient_gender,
        relationship = request.relationship,
        interests = request.trimmed_interests().join(", "),
        occasion = request.occasion,
        style = style_section,
        restrictions = restrictions_section,
        budget_min = currency::format_amount(request.budget_min, request.currency),
        budget_max = currency::format_amount(request.budget_max, request.currency),
        korean = crate::llm_client::prompts::KOREAN_OUTPUT_INSTRUCTION,
    )
}
