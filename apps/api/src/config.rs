use anyhow::{Context, Result};

/// Placeholder value that some deployments leave in .env templates.
/// Treated the same as an unset key.
const OPENAI_PLACEHOLDER_KEY: &str = "your-openai-api-key-here";

/// Application configuration loaded from environment variables.
/// All third-party API keys are optional; missing keys put the affected
/// client into simulation mode rather than failing startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub cors_origins: Vec<String>,

    pub openai_api_key: Option<String>,
    pub brave_search_api_key: Option<String>,
    pub apify_api_key: Option<String>,
    pub naver_client_id: Option<String>,
    pub naver_client_secret: Option<String>,

    pub max_recommendations: usize,
    pub api_timeout_secs: u64,
    pub rate_limit_per_minute: u32,

    pub enable_mcp_pipeline: bool,
    pub enable_brave_search: bool,
    pub enable_apify_scraping: bool,

    pub ai_cache_ttl_secs: u64,
    pub search_cache_ttl_secs: u64,
    pub product_cache_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            host: env_or("HOST", "0.0.0.0"),
            port: env_or("PORT", "8000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            environment: env_or("ENVIRONMENT", "development"),
            rust_log: env_or("RUST_LOG", "info"),
            cors_origins: env_or(
                "CORS_ORIGINS",
                "http://localhost:3000,http://127.0.0.1:3000,https://gift-genie.vercel.app",
            )
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),

            openai_api_key: optional_env("OPENAI_API_KEY"),
            brave_search_api_key: optional_env("BRAVE_SEARCH_API_KEY"),
            apify_api_key: optional_env("APIFY_API_KEY"),
            naver_client_id: optional_env("NAVER_CLIENT_ID"),
            naver_client_secret: optional_env("NAVER_CLIENT_SECRET"),

            max_recommendations: env_or("MAX_RECOMMENDATIONS", "5")
                .parse::<usize>()
                .context("MAX_RECOMMENDATIONS must be a positive integer")?,
            api_timeout_secs: env_or("API_TIMEOUT_SECS", "30")
                .parse::<u64>()
                .context("API_TIMEOUT_SECS must be a positive integer")?,
            rate_limit_per_minute: env_or("RATE_LIMIT_PER_MINUTE", "10")
                .parse::<u32>()
                .context("RATE_LIMIT_PER_MINUTE must be a positive integer")?,

            enable_mcp_pipeline: env_flag("ENABLE_MCP_PIPELINE", true),
            enable_brave_search: env_flag("ENABLE_BRAVE_SEARCH", true),
            enable_apify_scraping: env_flag("ENABLE_APIFY_SCRAPING", true),

            // TTLs: AI 30 min, search 1 h, product details 6 h
            ai_cache_ttl_secs: env_or("AI_CACHE_TTL_SECS", "1800")
                .parse::<u64>()
                .context("AI_CACHE_TTL_SECS must be a positive integer")?,
            search_cache_ttl_secs: env_or("SEARCH_CACHE_TTL_SECS", "3600")
                .parse::<u64>()
                .context("SEARCH_CACHE_TTL_SECS must be a positive integer")?,
            product_cache_ttl_secs: env_or("PRODUCT_CACHE_TTL_SECS", "21600")
                .parse::<u64>()
                .context("PRODUCT_CACHE_TTL_SECS must be a positive integer")?,
        })
    }

    /// True when a usable OpenAI key is present (placeholder counts as unset).
    pub fn openai_configured(&self) -> bool {
        self.openai_api_key
            .as_deref()
            .map(|k| k != OPENAI_PLACEHOLDER_KEY)
            .unwrap_or(false)
    }

    pub fn naver_configured(&self) -> bool {
        self.naver_client_id.is_some() && self.naver_client_secret.is_some()
    }

    /// The service-wide simulation predicate: any missing pipeline key means
    /// the full pipeline cannot run against live APIs.
    pub fn is_simulation_mode(&self) -> bool {
        !self.openai_configured()
            || self.brave_search_api_key.is_none()
            || self.apify_api_key.is_none()
    }

    /// Effective OpenAI key, with the placeholder filtered out.
    pub fn effective_openai_key(&self) -> Option<String> {
        if self.openai_configured() {
            self.openai_api_key.clone()
        } else {
            None
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}
