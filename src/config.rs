// ABOUTME: Configuration module for the slidegen pipeline
// ABOUTME: Provides pipeline settings and environment variable handling

use crate::provider::Provider;
use std::env;
use std::time::Duration;

/// Tunable settings for the image-generation pipeline.
///
/// The defaults mirror the shipped product choices; every one of them can be
/// overridden through a `SLIDEGEN_*` environment variable so a host can run
/// multiple independently configured sessions.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of real generation calls allowed per session.
    pub credit_budget: u32,
    /// Slides processed synchronously before control returns to the caller.
    pub priority_count: usize,
    /// Prompts shorter than this are never enhanced.
    pub enhance_min_chars: usize,
    /// Pause between background dispatches, on top of rate-limiter delays.
    pub inter_request_delay_ms: u64,
    /// Maximum calls admitted per provider within one rate window.
    pub rate_limit: u32,
    /// Length of the rolling rate window.
    pub rate_window_ms: u64,
    /// Per-call timeout; expiry resolves as an Unavailable failure.
    pub request_timeout_ms: u64,
    /// Backoff before the single retry allowed after a rate-limit rejection.
    pub retry_backoff_ms: u64,
    /// Endpoint of the text-capable provider.
    pub text_endpoint: String,
    /// Endpoint of the photo-realistic provider.
    pub photo_endpoint: String,
    /// Bearer token sent to both providers.
    pub api_key: Option<String>,
    /// Per-presentation override that beats the classifier's provider routing.
    pub provider_override: Option<Provider>,
    /// Requested style token; invalid values coerce to the provider default.
    pub style: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            credit_budget: 20,
            priority_count: 2,
            enhance_min_chars: 150,
            inter_request_delay_ms: 1200,
            rate_limit: 10,
            rate_window_ms: 60_000,
            request_timeout_ms: 30_000,
            retry_backoff_ms: 2_000,
            text_endpoint: "https://api.example-text.dev/v1/images".to_string(),
            photo_endpoint: "https://api.example-photo.dev/v1/images".to_string(),
            api_key: None,
            provider_override: None,
            style: None,
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(default)
}

impl PipelineConfig {
    /// Create a new configuration instance with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let provider_override = env::var("SLIDEGEN_PROVIDER")
            .ok()
            .and_then(|s| Provider::parse(&s));

        Self {
            credit_budget: env_u32("SLIDEGEN_CREDIT_BUDGET", defaults.credit_budget),
            priority_count: env_u64("SLIDEGEN_PRIORITY_COUNT", defaults.priority_count as u64)
                as usize,
            enhance_min_chars: env_u64(
                "SLIDEGEN_ENHANCE_MIN_CHARS",
                defaults.enhance_min_chars as u64,
            ) as usize,
            inter_request_delay_ms: env_u64(
                "SLIDEGEN_INTER_REQUEST_DELAY_MS",
                defaults.inter_request_delay_ms,
            ),
            rate_limit: env_u32("SLIDEGEN_RATE_LIMIT", defaults.rate_limit),
            rate_window_ms: env_u64("SLIDEGEN_RATE_WINDOW_MS", defaults.rate_window_ms),
            request_timeout_ms: env_u64("SLIDEGEN_REQUEST_TIMEOUT_MS", defaults.request_timeout_ms),
            retry_backoff_ms: env_u64("SLIDEGEN_RETRY_BACKOFF_MS", defaults.retry_backoff_ms),
            text_endpoint: env::var("SLIDEGEN_TEXT_ENDPOINT").unwrap_or(defaults.text_endpoint),
            photo_endpoint: env::var("SLIDEGEN_PHOTO_ENDPOINT").unwrap_or(defaults.photo_endpoint),
            api_key: env::var("SLIDEGEN_API_KEY").ok(),
            provider_override,
            style: env::var("SLIDEGEN_STYLE").ok(),
        }
    }

    /// Endpoint for the given provider.
    pub fn endpoint(&self, provider: Provider) -> &str {
        match provider {
            Provider::TextCapable => &self.text_endpoint,
            Provider::PhotoRealistic => &self.photo_endpoint,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_millis(self.rate_window_ms)
    }

    pub fn inter_request_delay(&self) -> Duration {
        Duration::from_millis(self.inter_request_delay_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}
