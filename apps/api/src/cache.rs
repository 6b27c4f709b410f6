//! In-process TTL caches for the recommendation pipeline.
//!
//! Three tiers with independent lifetimes:
//!   - ai:      full AI recommendation sets, keyed by request (30 min default)
//!   - search:  search result lists, keyed by keywords + budget (1 h default)
//!   - product: per-URL enriched product details (6 h default)

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;

use crate::config::Config;
use crate::models::response::{GiftRecommendation, ProductSearchResult};

const MAX_ENTRIES_PER_TIER: u64 = 10_000;

#[derive(Clone)]
pub struct PipelineCache {
    ai: Cache<String, Vec<GiftRecommendation>>,
    search: Cache<String, Vec<ProductSearchResult>>,
    product: Cache<String, ProductSearchResult>,
}

impl PipelineCache {
    pub fn new(config: &Config) -> Self {
        Self {
            ai: build_tier(config.ai_cache_ttl_secs),
            search: build_tier(config.search_cache_ttl_secs),
            product: build_tier(config.product_cache_ttl_secs),
        }
    }

    pub async fn get_ai(&self, key: &str) -> Option<Vec<GiftRecommendation>> {
        self.ai.get(key).await
    }

    pub async fn set_ai(&self, key: String, value: Vec<GiftRecommendation>) {
        self.ai.insert(key, value).await;
    }

    pub async fn get_search(&self, key: &str) -> Option<Vec<ProductSearchResult>> {
        self.search.get(key).await
    }

    pub async fn set_search(&self, key: String, value: Vec<ProductSearchResult>) {
        self.search.insert(key, value).await;
    }

    pub async fn get_product(&self, url: &str) -> Option<ProductSearchResult> {
        self.product.get(url).await
    }

    pub async fn set_product(&self, url: String, value: ProductSearchResult) {
        self.product.insert(url, value).await;
    }
}

fn build_tier<V>(ttl_secs: u64) -> Cache<String, V>
where
    V: Clone + Send + Sync + 'static,
{
    Cache::builder()
        .max_capacity(MAX_ENTRIES_PER_TIER)
        .time_to_live(Duration::from_secs(ttl_secs))
        .build()
}

/// Builds a stable cache key from a prefix and any serializable payload.
pub fn cache_key<T: Serialize>(prefix: &str, payload: &T) -> String {
    let serialized = serde_json::to_string(payload).unwrap_or_default();
    let mut hasher = DefaultHasher::new();
    serialized.hash(&mut hasher);
    format!("{prefix}:{:016x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;

    fn test_config() -> Config {
        // from_env with no overrides yields the default TTLs
        Config::from_env().expect("default config")
    }

    fn sample_product() -> ProductSearchResult {
        ProductSearchResult {
            title: "Coffee Gift Set".to_string(),
            url: "https://amazon.com/dp/example1".to_string(),
            description: "Premium coffee gift.".to_string(),
            domain: "amazon.com".to_string(),
            price: Some(85),
            currency: Some(Currency::Usd),
            price_display: Some("$85".to_string()),
            image_url: None,
            rating: Some(4.1),
            review_count: Some(200),
        }
    }

    #[test]
    fn test_cache_key_is_stable() {
        let a = cache_key("search", &("커피", 150));
        let b = cache_key("search", &("커피", 150));
        assert_eq!(a, b);
    }

    #[test]
    fn test_cache_key_differs_by_payload_and_prefix() {
        let a = cache_key("search", &("커피", 150));
        let b = cache_key("search", &("커피", 200));
        let c = cache_key("ai", &("커피", 150));
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn test_product_tier_round_trip() {
        let cache = PipelineCache::new(&test_config());
        let product = sample_product();
        cache
            .set_product(product.url.clone(), product.clone())
            .await;
        let hit = cache.get_product(&product.url).await;
        assert_eq!(hit.map(|p| p.title), Some("Coffee Gift Set".to_string()));
    }

    #[tokio::test]
    async fn test_search_tier_miss_then_hit() {
        let cache = PipelineCache::new(&test_config());
        let key = cache_key("search", &("커피", 150));
        assert!(cache.get_search(&key).await.is_none());
        cache.set_search(key.clone(), vec![sample_product()]).await;
        assert_eq!(cache.get_search(&key).await.map(|v| v.len()), Some(1));
    }
}
