// ABOUTME: Error types for the slidegen pipeline
// ABOUTME: Provides structured error handling for provider calls and scheduling

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("Provider authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Provider rejected the request: {0}")]
    ValidationError(String),

    #[error("Provider rate limit hit: {0}")]
    RateLimited(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Session credit budget exhausted")]
    CreditsExhausted,

    #[error("Malformed slide: {0}")]
    SlideError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to read file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl GenError {
    /// Whether the scheduler may retry the attempt that produced this error.
    /// Only rate-limit rejections get a second attempt; authentication and
    /// validation failures are configuration problems a retry cannot fix.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenError::RateLimited(_))
    }
}

// Transport-level reqwest failures all land in Unavailable; status-code
// classification happens in the provider client before this conversion runs.
impl From<reqwest::Error> for GenError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenError::Unavailable(format!("request timed out: {}", err))
        } else if err.is_connect() {
            GenError::Unavailable(format!("connection failed: {}", err))
        } else if err.is_decode() {
            GenError::MalformedResponse(err.to_string())
        } else {
            GenError::Unavailable(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, GenError>;
