//! Refinement strategy ladder and the deterministic fallbacks.

use serde::{Deserialize, Serialize};

/// One keyword-rewriting strategy. Attempts walk the ladder in order:
/// synonym expansion first, budget pivot last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefinementStrategy {
    SynonymExpansion,
    CategoryBroadening,
    MarketResearch,
    DemographicAdaptation,
    BudgetAlternative,
}

impl RefinementStrategy {
    pub const LADDER: [RefinementStrategy; 5] = [
        RefinementStrategy::SynonymExpansion,
        RefinementStrategy::CategoryBroadening,
        RefinementStrategy::MarketResearch,
        RefinementStrategy::DemographicAdaptation,
        RefinementStrategy::BudgetAlternative,
    ];

    /// Strategy for a 1-based attempt number. Attempts past the ladder end
    /// stay on the last strategy.
    pub fn for_attempt(attempt: u32) -> Self {
        let index = (attempt.saturating_sub(1) as usize).min(Self::LADDER.len() - 1);
        Self::LADDER[index]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RefinementStrategy::SynonymExpansion => "synonym_expansion",
            RefinementStrategy::CategoryBroadening => "category_broadening",
            RefinementStrategy::MarketResearch => "market_research",
            RefinementStrategy::DemographicAdaptation => "demographic_adaptation",
            RefinementStrategy::BudgetAlternative => "budget_alternative",
        }
    }

    /// Per-strategy instruction injected into the refinement prompt.
    pub fn guidance(&self) -> &'static str {
        match self {
            RefinementStrategy::SynonymExpansion => {
                "동의어와 유사 표현을 활용해 검색 범위를 확장하세요."
            }
            RefinementStrategy::CategoryBroadening => {
                "상위 카테고리나 관련 카테고리로 검색 범위를 넓히세요."
            }
            RefinementStrategy::MarketResearch => {
                "시장 인기 상품과 트렌드를 반영한 현재 소비자 선호에 맞는 키워드로 조정하세요."
            }
            RefinementStrategy::DemographicAdaptation => {
                "받는 사람의 나이, 성별, 관심사에 더 특화된 키워드로 조정하세요."
            }
            RefinementStrategy::BudgetAlternative => {
                "예산 범위에 맞는 대안 상품 키워드로 완전히 전환하세요."
            }
        }
    }

    /// Deterministic keyword rewrite used when no LLM is configured.
    pub fn simulated_keywords(&self, original: &[String]) -> Vec<String> {
        let base = original
            .first()
            .map(String::as_str)
            .unwrap_or("선물")
            .to_string();

        let extras: [&str; 2] = match self {
            RefinementStrategy::SynonymExpansion => ["무선", "프리미엄"],
            RefinementStrategy::CategoryBroadening => ["생활용품", "액세서리"],
            RefinementStrategy::MarketResearch => ["인기", "트렌드"],
            RefinementStrategy::DemographicAdaptation => ["맞춤", "선물"],
            RefinementStrategy::BudgetAlternative => ["가성비", "합리적"],
        };

        let mut keywords = vec![base];
        keywords.extend(extras.iter().map(|s| s.to_string()));
        keywords
    }
}

/// Modifier ladder for rule-based fallback refinement.
const FALLBACK_MODIFIERS: [&str; 5] = ["프리미엄", "인기", "추천", "베스트", "신상"];

/// Rule-based safe-default refinement: one modifier for the attempt plus the
/// first three original keywords. Used when the LLM fails or its output
/// scores below the quality threshold.
pub fn fallback_keywords(original: &[String], attempt: u32) -> Vec<String> {
    let index = (attempt.saturating_sub(1) as usize).min(FALLBACK_MODIFIERS.len() - 1);
    let mut keywords = vec![FALLBACK_MODIFIERS[index].to_string()];
    keywords.extend(original.iter().take(3).cloned());
    keywords
}
