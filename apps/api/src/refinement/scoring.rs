//! Keyword quality scoring for refined search queries.
//!
//! Refined keyword sets are scored 0..=100 before being sent to search.
//! Sets below [`ACCEPT_THRESHOLD`] are discarded in favor of the rule-based
//! fallback keywords.

use std::collections::HashSet;

/// Minimum score a refined keyword set needs to be used as-is.
pub const ACCEPT_THRESHOLD: u32 = 55;

/// Terms too broad to narrow a shopping search on their own.
const GENERIC_TERMS: &[&str] = &["선물", "상품", "아이템", "제품", "추천", "인기", "베스트"];

/// Scores a keyword set. Penalties, from a base of 100:
///
/// - keyword count: 3..=5 is ideal; 2 or 6 costs 15, anything further 30
/// - tokens shorter than 2 chars cost 10 each
/// - case-insensitive duplicates cost 15 each
/// - keywords already seen in failed attempts cost 20 each
/// - generic filler terms cost 10 each
///
/// `failed` must hold lowercased keywords from earlier unsuccessful attempts.
pub fn score_keywords(keywords: &[String], failed: &HashSet<String>) -> u32 {
    if keywords.is_empty() {
        return 0;
    }

    let mut score: i32 = 100;

    match keywords.len() {
        3..=5 => {}
        2 | 6 => score -= 15,
        _ => score -= 30,
    }

    let mut seen = HashSet::new();
    for keyword in keywords {
        if keyword.chars().count() < 2 {
            score -= 10;
        }

        let lowered = keyword.to_lowercase();
        if !seen.insert(lowered.clone()) {
            score -= 15;
        }
        if failed.contains(&lowered) {
            score -= 20;
        }
        if GENERIC_TERMS.contains(&keyword.as_str()) {
            score -= 10;
        }
    }

    score.clamp(0, 100) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_ideal_set_scores_full() {
        let score = score_keywords(&kw(&["커피머신", "원두", "그라인더"]), &HashSet::new());
        assert_eq!(score, 100);
    }

    #[test]
    fn test_empty_set_scores_zero() {
        assert_eq!(score_keywords(&[], &HashSet::new()), 0);
    }

    #[test]
    fn test_count_band_penalties() {
        let two = score_keywords(&kw(&["커피머신", "원두"]), &HashSet::new());
        assert_eq!(two, 85);
        let one = score_keywords(&kw(&["커피머신"]), &HashSet::new());
        assert_eq!(one, 70);
        let seven: Vec<String> = (0..7).map(|i| format!("키워드{i}")).collect();
        assert_eq!(score_keywords(&seven, &HashSet::new()), 70);
    }

    #[test]
    fn test_short_tokens_penalized() {
        let score = score_keywords(&kw(&["커피머신", "원두", "a"]), &HashSet::new());
        assert_eq!(score, 90);
    }

    #[test]
    fn test_duplicates_penalized_case_insensitively() {
        let score = score_keywords(&kw(&["Coffee", "coffee", "grinder"]), &HashSet::new());
        assert_eq!(score, 85);
    }

    #[test]
    fn test_failed_keywords_penalized() {
        let failed: HashSet<String> = ["커피머신".to_string()].into_iter().collect();
        let score = score_keywords(&kw(&["커피머신", "원두", "그라인더"]), &failed);
        assert_eq!(score, 80);
    }

    #[test]
    fn test_generic_terms_penalized() {
        let score = score_keywords(&kw(&["선물", "추천", "인기"]), &HashSet::new());
        assert_eq!(score, 70);
    }

    #[test]
    fn test_score_never_goes_negative() {
        let failed: HashSet<String> = ["선물".to_string(), "추천".to_string()]
            .into_iter()
            .collect();
        let score = score_keywords(&kw(&["선물", "선물", "추천", "추천", "선물", "추천", "a"]), &failed);
        assert_eq!(score, 0);
    }

    #[test]
    fn test_threshold_separates_fallback_worthy_sets() {
        // Fallback modifier + originals: always acceptable
        let fallback = kw(&["프리미엄", "커피", "원두", "여행"]);
        assert!(score_keywords(&fallback, &HashSet::new()) >= ACCEPT_THRESHOLD);
        // All-generic single keyword: never acceptable
        let bad = kw(&["추천"]);
        assert!(score_keywords(&bad, &HashSet::new()) < ACCEPT_THRESHOLD);
    }
}
