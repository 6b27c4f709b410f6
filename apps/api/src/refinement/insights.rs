//! Demographic market insights for the market-research strategy.
//!
//! A small built-in knowledge base of popular products and trending
//! modifiers per age group and gender, used to bias refined keywords
//! toward what actually sells.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeGroup {
    Teens,
    Twenties,
    Thirties,
    Forties,
    Seniors,
}

pub fn age_group(age: u32) -> AgeGroup {
    match age {
        0..=19 => AgeGroup::Teens,
        20..=29 => AgeGroup::Twenties,
        30..=39 => AgeGroup::Thirties,
        40..=49 => AgeGroup::Forties,
        _ => AgeGroup::Seniors,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketInsights {
    pub suggested_products: Vec<String>,
    pub trending_keywords: Vec<String>,
    pub average_price_krw: i64,
    pub popular_range_krw: (i64, i64),
    pub summary: String,
}

/// Looks up popular products and trending modifiers for the recipient.
pub fn market_insights(age: u32, gender: &str) -> MarketInsights {
    let group = age_group(age);

    let (products, average_price_krw, popular_range_krw, label): (&[&str], i64, (i64, i64), &str) =
        match group {
            AgeGroup::Teens => (
                &["게임기", "이어폰", "학용품", "캐릭터굿즈"],
                60_000,
                (30_000, 100_000),
                "10대",
            ),
            AgeGroup::Twenties => (
                &["무선이어폰", "노트북", "커피", "패션악세서리"],
                100_000,
                (50_000, 200_000),
                "20대",
            ),
            AgeGroup::Thirties => (
                &["향수", "가전제품", "인테리어소품", "건강식품"],
                150_000,
                (80_000, 300_000),
                "30대",
            ),
            AgeGroup::Forties => (
                &["건강식품", "생활가전", "골프용품", "화장품"],
                200_000,
                (100_000, 400_000),
                "40대",
            ),
            AgeGroup::Seniors => (
                &["건강식품", "안마용품", "차세트", "여행용품"],
                180_000,
                (80_000, 350_000),
                "50대 이상",
            ),
        };

    let mut trending: Vec<String> = ["인기", "추천", "베스트"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let gender_terms: &[&str] = if gender.contains("여성") || gender.eq_ignore_ascii_case("female") {
        &["예쁜", "감성적", "여성용"]
    } else if gender.contains("남성") || gender.eq_ignore_ascii_case("male") {
        &["실용적", "기능성", "남성용"]
    } else {
        &[]
    };
    trending.extend(gender_terms.iter().map(|s| s.to_string()));
    trending.truncate(4);

    MarketInsights {
        suggested_products: products.iter().map(|s| s.to_string()).collect(),
        trending_keywords: trending,
        average_price_krw,
        popular_range_krw,
        summary: format!(
            "{label} 선호 상품군 {}종, 평균 가격대 {average_price_krw}원",
            products.len()
        ),
    }
}

/// Folds market suggestions into an existing keyword set: up to two
/// suggested products and one trending modifier, deduplicated, capped at 5.
pub fn integrate_suggestions(current: &[String], insights: &MarketInsights) -> Vec<String> {
    let mut merged: Vec<String> = current.to_vec();

    for product in insights.suggested_products.iter().take(2) {
        if !merged.iter().any(|k| k == product) {
            merged.push(product.clone());
        }
    }
    if let Some(trend) = insights.trending_keywords.first() {
        if !merged.iter().any(|k| k == trend) {
            merged.push(trend.clone());
        }
    }

    merged.truncate(5);
    merged
}
