//! Intelligent query refinement: strategy-driven keyword rewriting with
//! bounded retries against a product search backend.

pub mod engine;
pub mod insights;
pub mod prompts;
pub mod scoring;
pub mod strategies;

pub use engine::{QueryRefinementEngine, RefinementSession, MIN_PRODUCTS_THRESHOLD};
pub use strategies::RefinementStrategy;
