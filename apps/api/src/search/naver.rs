//! Naver Shopping API client.
//!
//! Missing credentials fall back to a deterministic simulated catalog, so
//! the pipeline always produces output. Live call failures surface as
//! search errors, which the refinement loop isolates per attempt.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::search::{NaverProduct, ProductSearch};

const NAVER_SHOP_URL: &str = "https://openapi.naver.com/v1/search/shop.json";
const SEARCH_TIMEOUT_SECS: u64 = 10;
/// Default page size requested from the API.
pub const DEFAULT_DISPLAY: u32 = 10;

/// Result ordering accepted by the shop search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Price ascending, cheapest offers first.
    PriceAscending,
    /// Price descending.
    #[allow(dead_code)]
    PriceDescending,
}

impl SortOrder {
    fn as_param(&self) -> &'static str {
        match self {
            SortOrder::PriceAscending => "asc",
            SortOrder::PriceDescending => "dsc",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ShopSearchResponse {
    #[serde(default)]
    items: Vec<ShopItem>,
}

/// Raw wire item. Naver returns prices and product types as strings.
#[derive(Debug, Deserialize)]
struct ShopItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    lprice: String,
    #[serde(default)]
    hprice: String,
    #[serde(default, rename = "mallName")]
    mall_name: String,
    #[serde(default, rename = "productId")]
    product_id: String,
    #[serde(default, rename = "productType")]
    product_type: String,
    #[serde(default)]
    brand: String,
    #[serde(default)]
    maker: String,
    #[serde(default)]
    category1: String,
    #[serde(default)]
    category2: String,
    #[serde(default)]
    category3: String,
    #[serde(default)]
    category4: String,
}

#[derive(Clone)]
pub struct NaverShoppingClient {
    client: Client,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl NaverShoppingClient {
    pub fn new(client_id: Option<String>, client_secret: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(SEARCH_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            client_id,
            client_secret,
        }
    }

    pub fn enabled(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }

    /// Searches the shop API for products within the KRW budget.
    pub async fn search_products(
        &self,
        keywords: &[String],
        budget_max_krw: i64,
        display: u32,
        sort: SortOrder,
    ) -> Result<Vec<NaverProduct>, AppError> {
        let (Some(client_id), Some(client_secret)) = (&self.client_id, &self.client_secret) else {
            return Ok(simulate_search(keywords, budget_max_krw, display));
        };

        // Up to 3 keywords combined into one query
        let query = keywords
            .iter()
            .take(3)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        info!(
            "Searching Naver Shopping: '{}', budget_max: {}원",
            query, budget_max_krw
        );

        let response = self
            .client
            .get(NAVER_SHOP_URL)
            .header("X-Naver-Client-Id", client_id)
            .header("X-Naver-Client-Secret", client_secret)
            .query(&[
                ("query", query.as_str()),
                ("display", &display.to_string()),
                ("start", "1"),
                ("sort", sort.as_param()),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                warn!("Naver Shopping API error: {}", r.status());
                return Err(AppError::Search(format!(
                    "Naver Shopping API returned {}",
                    r.status()
                )));
            }
            Err(e) => {
                warn!("Naver Shopping API failed: {e}");
                return Err(AppError::Search(format!(
                    "Naver Shopping request failed: {e}"
                )));
            }
        };

        let data = response
            .json::<ShopSearchResponse>()
            .await
            .map_err(|e| AppError::Search(format!("Naver Shopping response parse failed: {e}")))?;

        info!("Naver API returned {} raw products", data.items.len());
        let results = process_search_results(data, budget_max_krw);
        info!("After filtering: {} products within budget", results.len());
        Ok(results)
    }
}

#[async_trait]
impl ProductSearch for NaverShoppingClient {
    async fn search(
        &self,
        keywords: &[String],
        budget_max_krw: i64,
    ) -> Result<Vec<NaverProduct>, AppError> {
        self.search_products(keywords, budget_max_krw, DEFAULT_DISPLAY, SortOrder::PriceAscending)
            .await
    }
}

/// Converts raw wire items into products, dropping anything unpriced or over
/// budget. Individual malformed items are skipped, never fatal.
fn process_search_results(data: ShopSearchResponse, budget_max_krw: i64) -> Vec<NaverProduct> {
    let mut results = Vec::new();
    let mut over_budget = 0usize;

    for item in data.items {
        let Ok(lprice) = item.lprice.parse::<i64>() else {
            warn!(
                "Product '{}' has no usable price ('{}'), skipping",
                item.title, item.lprice
            );
            continue;
        };
        if lprice <= 0 {
            continue;
        }
        if lprice > budget_max_krw {
            over_budget += 1;
            continue;
        }

        // hprice is often empty; fall back to lprice
        let hprice = item.hprice.parse::<i64>().unwrap_or(lprice);
        let product_type = item.product_type.parse::<i32>().unwrap_or(1);

        results.push(NaverProduct {
            title: strip_html_tags(&item.title),
            link: item.link,
            image: item.image,
            lprice,
            hprice,
            mall_name: item.mall_name,
            product_id: item.product_id,
            product_type,
            brand: item.brand,
            maker: item.maker,
            category1: item.category1,
            category2: item.category2,
            category3: item.category3,
            category4: item.category4,
        });
    }

    info!(
        "Filtering results: {} products over budget, {} within budget",
        over_budget,
        results.len()
    );
    results
}

/// Removes markup like `<b>…</b>` that Naver embeds in product titles.
fn strip_html_tags(text: &str) -> String {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    let re = TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex"));
    re.replace_all(text, "").into_owned()
}

/// Deterministic catalog used when credentials are missing.
fn simulate_search(keywords: &[String], budget_max_krw: i64, display: u32) -> Vec<NaverProduct> {
    let keyword = keywords
        .first()
        .map(String::as_str)
        .unwrap_or("선물")
        .to_string();

    let count = display.min(5) as i64;
    (0..count)
        .filter_map(|i| {
            let price = (budget_max_krw - i * 10_000).min(budget_max_krw - 5_000);
            if price <= 0 {
                return None;
            }
            Some(NaverProduct {
                title: format!("{keyword} 추천 상품 #{}", i + 1),
                link: format!("https://shopping.naver.com/product/{}", 1000 + i),
                image: format!("https://source.unsplash.com/400x400/?{keyword},product"),
                lprice: price,
                hprice: price + 10_000,
                mall_name: format!("쇼핑몰{}", i + 1),
                product_id: format!("prod_{}", 1000 + i),
                product_type: 1,
                brand: format!("브랜드{}", i + 1),
                maker: format!("제조사{}", i + 1),
                category1: "생활/건강".to_string(),
                category2: "생활용품".to_string(),
                category3: keyword.clone(),
                category4: String::new(),
            })
        })
        .collect()
}
