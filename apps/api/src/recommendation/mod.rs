//! Recommendation engines: AI-only, search-enhanced, and Naver Shopping.

pub mod engine;
pub mod keywords;
pub mod naver;
pub mod pipeline;
pub mod prompts;

pub use engine::RecommendationEngine;
pub use naver::NaverRecommendationEngine;
pub use pipeline::EnhancedRecommendationEngine;
