//! Brave web search client for product discovery.
//!
//! Used by the enhanced (MCP) pipeline. Missing key or a failed call falls
//! back to a deterministic simulated catalog.

use std::sync::OnceLock;

use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::currency::Currency;
use crate::models::response::ProductSearchResult;

const BRAVE_SEARCH_URL: &str = "https://api.search.brave.com/res/v1/web/search";
const SEARCH_TIMEOUT_SECS: u64 = 10;
/// How many web hits to keep as product candidates.
const MAX_RESULTS: usize = 5;

#[derive(Debug, Deserialize)]
struct WebSearchResponse {
    #[serde(default)]
    web: Option<WebResults>,
}

#[derive(Debug, Deserialize)]
struct WebResults {
    #[serde(default)]
    results: Vec<WebResult>,
}

#[derive(Debug, Deserialize)]
struct WebResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
}

#[derive(Clone)]
pub struct BraveSearchClient {
    client: Client,
    api_key: Option<String>,
}

impl BraveSearchClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(SEARCH_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    pub fn enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Searches the web for purchasable products matching the keywords.
    /// Failures degrade to the simulated catalog rather than erroring.
    pub async fn search_products(
        &self,
        keywords: &[String],
        budget_max_usd: i64,
    ) -> Vec<ProductSearchResult> {
        let Some(api_key) = &self.api_key else {
            return simulate_search(keywords, budget_max_usd);
        };

        let query = format!(
            "{} shop buy gift under ${budget_max_usd}",
            keywords
                .iter()
                .take(3)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" ")
        );

        let response = self
            .client
            .get(BRAVE_SEARCH_URL)
            .header("Accept", "application/json")
            .header("Accept-Encoding", "gzip")
            .header("X-Subscription-Token", api_key)
            .query(&[
                ("q", query.as_str()),
                ("count", "10"),
                ("search_lang", "en"),
                ("country", "US"),
                ("safesearch", "moderate"),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                warn!("Brave Search API error: {}", r.status());
                return simulate_search(keywords, budget_max_usd);
            }
            Err(e) => {
                warn!("Brave Search failed: {e}");
                return simulate_search(keywords, budget_max_usd);
            }
        };

        match response.json::<WebSearchResponse>().await {
            Ok(data) => process_search_results(data, budget_max_usd),
            Err(e) => {
                warn!("Failed to parse Brave Search response: {e}");
                simulate_search(keywords, budget_max_usd)
            }
        }
    }
}

fn process_search_results(data: WebSearchResponse, budget_max_usd: i64) -> Vec<ProductSearchResult> {
    let results = data.web.map(|w| w.results).unwrap_or_default();

    results
        .into_iter()
        .take(MAX_RESULTS)
        .map(|result| {
            let domain = extract_domain(&result.url);
            let price =
                extract_price(&format!("{} {}", result.title, result.description), budget_max_usd);

            ProductSearchResult {
                title: result.title,
                url: result.url,
                description: result.description,
                domain,
                price: Some(price),
                currency: Some(Currency::Usd),
                price_display: Some(format!("${price}")),
                image_url: None,
                rating: None,
                review_count: None,
            }
        })
        .collect()
}

fn extract_domain(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Pulls a plausible price out of free text: `$85`, `85 dollars`, `USD 85`.
/// Values outside 10..=2×budget are treated as noise; when nothing plausible
/// is found, returns a default inside the budget.
fn extract_price(text: &str, budget_max_usd: i64) -> i64 {
    static PRICE_RE: OnceLock<Vec<Regex>> = OnceLock::new();
    let patterns = PRICE_RE.get_or_init(|| {
        vec![
            Regex::new(r"\$(\d+(?:\.\d{2})?)").expect("valid regex"),
            Regex::new(r"(\d+)\s*dollars?").expect("valid regex"),
            Regex::new(r"usd\s*(\d+)").expect("valid regex"),
        ]
    });

    let lowered = text.to_lowercase();
    for pattern in patterns {
        if let Some(captures) = pattern.captures(&lowered) {
            if let Ok(price) = captures[1].parse::<f64>() {
                let price = price as i64;
                if price >= 10 && price <= budget_max_usd * 2 {
                    return price;
                }
            }
        }
    }

    (budget_max_usd - 10).min(75).max(1)
}

/// Deterministic catalog used when the key is missing or the API fails.
fn simulate_search(keywords: &[String], budget_max_usd: i64) -> Vec<ProductSearchResult> {
    let keyword = keywords.first().map(String::as_str).unwrap_or("gift");

    let samples = [
        (
            format!("{keyword} Gift Set - Premium Edition"),
            "https://amazon.com/dp/example1",
            format!("Perfect {keyword} gift with premium quality and elegant design."),
            "amazon.com",
            (budget_max_usd - 10).min(85),
        ),
        (
            format!("Best {keyword} Collection - Top Rated"),
            "https://etsy.com/listing/example2",
            format!("Handcrafted {keyword} items, highly rated by customers."),
            "etsy.com",
            (budget_max_usd - 25).min(65),
        ),
        (
            format!("{keyword} Starter Kit - Complete Set"),
            "https://target.com/p/example3",
            format!("Everything needed for {keyword} enthusiasts."),
            "target.com",
            (budget_max_usd - 15).min(70),
        ),
    ];

    samples
        .into_iter()
        .map(|(title, url, description, domain, price)| {
            let price = price.max(1);
            ProductSearchResult {
                title,
                url: url.to_string(),
                description,
                domain: domain.to_string(),
                price: Some(price),
                currency: Some(Currency::Usd),
                price_display: Some(format!("${price}")),
                image_url: None,
                rating: None,
                review_count: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_price_dollar_sign() {
        assert_eq!(extract_price("Premium set for $85 only", 150), 85);
    }

    #[test]
    fn test_extract_price_dollars_word() {
        assert_eq!(extract_price("only 45 dollars today", 150), 45);
    }

    #[test]
    fn test_extract_price_usd_prefix() {
        assert_eq!(extract_price("Great deal USD 120", 150), 120);
    }

    #[test]
    fn test_extract_price_rejects_implausible_values() {
        // $5000 is more than 2x a $150 budget, so the default applies
        let price = extract_price("luxury watch $5000", 150);
        assert_eq!(price, 75);
    }

    #[test]
    fn test_extract_price_default_within_budget() {
        assert_eq!(extract_price("no price here", 150), 75);
        assert_eq!(extract_price("no price here", 40), 30);
    }

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            extract_domain("https://www.amazon.com/dp/B01"),
            "www.amazon.com"
        );
        assert_eq!(extract_domain("not a url"), "Unknown");
    }

    #[test]
    fn test_process_results_caps_at_five() {
        let results = (0..8)
            .map(|i| WebResult {
                title: format!("Item {i} for $50"),
                url: format!("https://shop.example/{i}"),
                description: "A fine gift.".to_string(),
            })
            .collect();
        let data = WebSearchResponse {
            web: Some(WebResults { results }),
        };
        let processed = process_search_results(data, 150);
        assert_eq!(processed.len(), 5);
        assert_eq!(processed[0].price, Some(50));
        assert_eq!(processed[0].domain, "shop.example");
    }

    #[test]
    fn test_process_results_empty_web_block() {
        let data = WebSearchResponse { web: None };
        assert!(process_search_results(data, 150).is_empty());
    }

    #[test]
    fn test_simulated_catalog_shape() {
        let results = simulate_search(&["coffee".to_string()], 100);
        assert_eq!(results.len(), 3);
        assert!(results[0].title.contains("coffee"));
        assert!(results.iter().all(|r| r.price.unwrap() <= 100));
    }

    #[tokio::test]
    async fn test_client_without_key_simulates() {
        let client = BraveSearchClient::new(None);
        assert!(!client.enabled());
        let results = client.search_products(&["coffee".to_string()], 100).await;
        assert_eq!(results.len(), 3);
    }
}
