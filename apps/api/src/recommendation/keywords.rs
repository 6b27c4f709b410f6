//! Search keyword extraction from AI recommendations.
//!
//! Categories and interests map to terms that actually match product
//! listings; recommendation titles contribute the remainder.

use crate::models::response::GiftRecommendation;

const MAX_KEYWORDS: usize = 5;

/// AI category label -> shopping search term.
const CATEGORY_TERMS: &[(&str, &str)] = &[
    ("전자제품", "전자기기"),
    ("홈&리빙", "생활용품"),
    ("도서", "책"),
    ("식음료", "식품"),
    ("프리미엄 선물", "선물세트"),
];

/// Recipient interest -> shopping search term.
const INTEREST_TERMS: &[(&str, &str)] = &[
    ("독서", "책"),
    ("커피", "원두"),
    ("여행", "여행용품"),
    ("사진", "카메라"),
    ("운동", "스포츠용품"),
    ("요리", "주방용품"),
    ("음악", "오디오"),
];

/// Derives up to five search keywords from the recommendations and the
/// recipient's interests, in priority order: mapped categories, mapped
/// interests, then words from recommendation titles.
pub fn search_keywords(
    recommendations: &[GiftRecommendation],
    interests: &[String],
) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();

    for rec in recommendations {
        if let Some((_, term)) = CATEGORY_TERMS.iter().find(|(label, _)| *label == rec.category) {
            push_unique(&mut keywords, term);
        }
    }

    for interest in interests {
        let term = INTEREST_TERMS
            .iter()
            .find(|(label, _)| *label == interest.as_str())
            .map(|(_, term)| *term)
            .unwrap_or(interest.as_str());
        push_unique(&mut keywords, term);
    }

    for rec in recommendations {
        for word in rec.title.split_whitespace() {
            if word.chars().count() >= 2 {
                push_unique(&mut keywords, word);
            }
        }
    }

    keywords.truncate(MAX_KEYWORDS);
    keywords
}

fn push_unique(keywords: &mut Vec<String>, term: &str) {
    if keywords.len() < MAX_KEYWORDS && !keywords.iter().any(|k| k == term) {
        keywords.push(term.to_string());
    }
}
