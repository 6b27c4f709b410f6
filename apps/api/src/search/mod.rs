//! Product search backends and the search seam used by the refinement engine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub mod brave;
pub mod naver;

/// A shopping search product hit (Naver Shopping item shape).
/// Prices are KRW; `lprice` is the lowest offer, `hprice` the highest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaverProduct {
    pub title: String,
    pub link: String,
    pub image: String,
    pub lprice: i64,
    pub hprice: i64,
    pub mall_name: String,
    pub product_id: String,
    pub product_type: i32,
    pub brand: String,
    pub maker: String,
    pub category1: String,
    pub category2: String,
    pub category3: String,
    pub category4: String,
}

/// The product search seam. The refinement engine only depends on this trait,
/// so tests can drive the retry loop with scripted backends and the live
/// backend can be swapped without touching the loop.
#[async_trait]
pub trait ProductSearch: Send + Sync {
    /// Searches for products matching `keywords` priced within `budget_max_krw`.
    async fn search(
        &self,
        keywords: &[String],
        budget_max_krw: i64,
    ) -> Result<Vec<NaverProduct>, AppError>;
}
