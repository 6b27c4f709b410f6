//! The multi-attempt query refinement loop.
//!
//! Search attempts run until enough products come back or the attempt
//! budget is exhausted. Each attempt rewrites the keywords with the next
//! strategy on the ladder, scores the rewrite, and falls back to rule-based
//! keywords when the rewrite is unusable. The best attempt so far is kept
//! so an exhausted session still returns the most products any attempt saw.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::llm_client::LlmClient;
use crate::models::request::GiftRequest;
use crate::refinement::insights::{self, MarketInsights};
use crate::refinement::prompts;
use crate::refinement::scoring::{self, ACCEPT_THRESHOLD};
use crate::refinement::strategies::{self, RefinementStrategy};
use crate::search::{NaverProduct, ProductSearch};

pub const MAX_REFINEMENT_ATTEMPTS: u32 = 5;
/// A search attempt counts as successful once it finds at least this many products.
pub const MIN_PRODUCTS_THRESHOLD: usize = 3;
const INTER_ATTEMPT_DELAY: Duration = Duration::from_millis(500);

/// Record of a single refinement attempt.
#[derive(Debug, Clone, Serialize)]
pub struct RefinementAttempt {
    pub attempt_number: u32,
    pub original_keywords: Vec<String>,
    pub refined_keywords: Vec<String>,
    pub search_query: String,
    pub products_found: usize,
    pub success: bool,
    pub strategy: RefinementStrategy,
    pub quality_score: u32,
    pub processing_time_secs: f64,
    pub failure_reason: Option<String>,
    pub market_insights: Option<MarketInsights>,
}

/// Full record of a refinement session across all attempts.
#[derive(Debug, Clone, Serialize)]
pub struct RefinementSession {
    pub session_id: String,
    pub attempts: Vec<RefinementAttempt>,
    pub final_success: bool,
    pub total_products_found: usize,
    pub total_processing_time_secs: f64,
    /// Index into `attempts` of the attempt that found the most products.
    pub best_attempt: Option<usize>,
}

impl RefinementSession {
    pub fn best(&self) -> Option<&RefinementAttempt> {
        self.best_attempt.and_then(|i| self.attempts.get(i))
    }
}

/// Shape the LLM must return for a keyword rewrite.
#[derive(Debug, Deserialize)]
struct RefinedKeywords {
    refined_keywords: Vec<String>,
    #[serde(default)]
    search_query: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    reasoning: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    expected_improvement: Option<String>,
}

pub struct QueryRefinementEngine {
    llm: Option<LlmClient>,
}

impl QueryRefinementEngine {
    pub fn new(llm: Option<LlmClient>) -> Self {
        Self { llm }
    }

    /// Runs the refinement loop: up to [`MAX_REFINEMENT_ATTEMPTS`] searches,
    /// rewriting keywords between attempts, stopping early once an attempt
    /// finds [`MIN_PRODUCTS_THRESHOLD`] products. Returns the products of
    /// the successful (or best) attempt together with the session record.
    pub async fn refine_search_with_retries(
        &self,
        original_keywords: &[String],
        request: &GiftRequest,
        search: &dyn ProductSearch,
        budget_max_krw: i64,
    ) -> (Vec<NaverProduct>, RefinementSession) {
        let session_start = Instant::now();
        let session_id = format!("refine_{}", Uuid::new_v4().simple());

        let mut session = RefinementSession {
            session_id: session_id.clone(),
            attempts: Vec::new(),
            final_success: false,
            total_products_found: 0,
            total_processing_time_secs: 0.0,
            best_attempt: None,
        };

        // Lowercased keywords from attempts that came back short.
        let mut failed_keywords: HashSet<String> = HashSet::new();
        let mut best_products: Vec<NaverProduct> = Vec::new();

        for attempt_number in 1..=MAX_REFINEMENT_ATTEMPTS {
            if attempt_number > 1 {
                tokio::time::sleep(INTER_ATTEMPT_DELAY).await;
            }

            let attempt_start = Instant::now();
            let strategy = RefinementStrategy::for_attempt(attempt_number);

            let market_insights = (strategy == RefinementStrategy::MarketResearch)
                .then(|| insights::market_insights(request.recipient_age, &request.recipient_gender));

            let (keywords, search_query, quality_score) = self
                .keywords_for_attempt(
                    original_keywords,
                    &failed_keywords,
                    strategy,
                    request,
                    market_insights.as_ref(),
                    attempt_number,
                )
                .await;

            info!(
                session_id = %session_id,
                attempt = attempt_number,
                strategy = strategy.as_str(),
                quality_score,
                query = %search_query,
                "refinement attempt"
            );

            let mut attempt = RefinementAttempt {
                attempt_number,
                original_keywords: original_keywords.to_vec(),
                refined_keywords: keywords.clone(),
                search_query: search_query.clone(),
                products_found: 0,
                success: false,
                strategy,
                quality_score,
                processing_time_secs: 0.0,
                failure_reason: None,
                market_insights,
            };

            // A failed search is isolated to its own attempt; later attempts
            // still run.
            let products = match search.search(&keywords, budget_max_krw).await {
                Ok(products) => products,
                Err(e) => {
                    warn!(
                        session_id = %session_id,
                        attempt = attempt_number,
                        "search failed: {e}"
                    );
                    attempt.failure_reason = Some(e.to_string());
                    Vec::new()
                }
            };

            attempt.products_found = products.len();
            attempt.success = products.len() >= MIN_PRODUCTS_THRESHOLD;
            attempt.processing_time_secs = attempt_start.elapsed().as_secs_f64();

            if products.len() > best_products.len() {
                best_products = products.clone();
                session.best_attempt = Some(session.attempts.len());
            }

            let success = attempt.success;
            session.attempts.push(attempt);

            if success {
                session.final_success = true;
                session.total_products_found = products.len();
                session.total_processing_time_secs = session_start.elapsed().as_secs_f64();
                log_session_summary(&session);
                return (products, session);
            }

            for keyword in &keywords {
                failed_keywords.insert(keyword.to_lowercase());
            }
        }

        session.total_products_found = best_products.len();
        session.total_processing_time_secs = session_start.elapsed().as_secs_f64();
        log_session_summary(&session);

        (best_products, session)
    }

    /// Picks the keyword set for one attempt. Attempt 1 always searches the
    /// original keywords; later attempts rewrite via the LLM (or the
    /// deterministic strategy rewrite when no LLM is configured), falling
    /// back to rule-based keywords when the rewrite scores too low.
    async fn keywords_for_attempt(
        &self,
        original_keywords: &[String],
        failed_keywords: &HashSet<String>,
        strategy: RefinementStrategy,
        request: &GiftRequest,
        market_insights: Option<&MarketInsights>,
        attempt_number: u32,
    ) -> (Vec<String>, String, u32) {
        if attempt_number == 1 {
            let score = scoring::score_keywords(original_keywords, failed_keywords);
            let query = original_keywords.join(" ");
            return (original_keywords.to_vec(), query, score);
        }

        let (mut keywords, mut query) = match self
            .rewrite_keywords(
                original_keywords,
                failed_keywords,
                strategy,
                request,
                market_insights,
                attempt_number,
            )
            .await
        {
            Some((keywords, query)) => (keywords, query),
            None => {
                let keywords = strategy.simulated_keywords(original_keywords);
                let query = keywords.join(" ");
                (keywords, query)
            }
        };

        if let Some(insights) = market_insights {
            keywords = insights::integrate_suggestions(&keywords, insights);
            query = keywords.join(" ");
        }

        let score = scoring::score_keywords(&keywords, failed_keywords);
        if score < ACCEPT_THRESHOLD {
            warn!(
                score,
                threshold = ACCEPT_THRESHOLD,
                "refined keywords below quality threshold, using fallback"
            );
            let fallback = strategies::fallback_keywords(original_keywords, attempt_number);
            let fallback_score = scoring::score_keywords(&fallback, failed_keywords);
            let query = fallback.join(" ");
            return (fallback, query, fallback_score);
        }

        (keywords, query, score)
    }

    /// LLM keyword rewrite. Returns `None` when no LLM is configured, the
    /// call fails, or the response carries no keywords.
    async fn rewrite_keywords(
        &self,
        original_keywords: &[String],
        failed_keywords: &HashSet<String>,
        strategy: RefinementStrategy,
        request: &GiftRequest,
        market_insights: Option<&MarketInsights>,
        attempt_number: u32,
    ) -> Option<(Vec<String>, String)> {
        let llm = self.llm.as_ref()?;

        let failed: Vec<String> = failed_keywords.iter().cloned().collect();
        let prompt = prompts::refinement_prompt(
            original_keywords,
            &failed,
            strategy,
            request,
            market_insights,
            attempt_number,
        );

        let refined: RefinedKeywords = match llm
            .call_json(&prompt, prompts::REFINEMENT_SYSTEM)
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("keyword rewrite failed: {e}");
                return None;
            }
        };

        let keywords: Vec<String> = refined
            .refined_keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            return None;
        }

        let query = refined
            .search_query
            .filter(|q| !q.trim().is_empty())
            .unwrap_or_else(|| keywords.join(" "));

        Some((keywords, query))
    }
}

fn log_session_summary(session: &RefinementSession) {
    info!(
        session_id = %session.session_id,
        attempts = session.attempts.len(),
        final_success = session.final_success,
        total_products = session.total_products_found,
        best_attempt = session.best().map(|a| a.attempt_number),
        elapsed_secs = session.total_processing_time_secs,
        "refinement session finished"
    );
    for attempt in &session.attempts {
        info!(
            session_id = %session.session_id,
            attempt = attempt.attempt_number,
            strategy = attempt.strategy.as_str(),
            products = attempt.products_found,
            success = attempt.success,
            "  attempt summary"
        );
    }
}
