// ABOUTME: Provider abstraction for the two remote image-generation services
// ABOUTME: Defines style validation, the client trait and the HTTP implementation

use crate::config::PipelineConfig;
use crate::errors::{GenError, Result};
use crate::model::GenerationRequest;
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// A remote image-generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Favored for slides whose image must render legible text or diagrams.
    TextCapable,
    /// Favored for naturalistic scene imagery without embedded text.
    PhotoRealistic,
}

impl Provider {
    pub fn label(&self) -> &'static str {
        match self {
            Provider::TextCapable => "text",
            Provider::PhotoRealistic => "photo",
        }
    }

    /// Parse a provider name as used in configuration; unknown names are None.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "text-capable" => Some(Provider::TextCapable),
            "photo" | "photo-realistic" | "photorealistic" => Some(Provider::PhotoRealistic),
            _ => None,
        }
    }
}

/// Style tokens accepted by the providers.
///
/// Each provider understands its own subset; `resolve` coerces anything
/// unrecognized or foreign to the provider's documented default rather than
/// letting an invalid token reach the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStyle {
    // Text-capable provider set
    Illustration,
    Vector,
    Minimal,
    Corporate,
    // Photo-realistic provider set
    Photographic,
    Cinematic,
    Natural,
}

impl ImageStyle {
    pub fn token(&self) -> &'static str {
        match self {
            ImageStyle::Illustration => "illustration",
            ImageStyle::Vector => "vector",
            ImageStyle::Minimal => "minimal",
            ImageStyle::Corporate => "corporate",
            ImageStyle::Photographic => "photographic",
            ImageStyle::Cinematic => "cinematic",
            ImageStyle::Natural => "natural",
        }
    }

    pub fn default_for(provider: Provider) -> Self {
        match provider {
            Provider::TextCapable => ImageStyle::Illustration,
            Provider::PhotoRealistic => ImageStyle::Photographic,
        }
    }

    pub fn valid_for(&self, provider: Provider) -> bool {
        match provider {
            Provider::TextCapable => matches!(
                self,
                ImageStyle::Illustration
                    | ImageStyle::Vector
                    | ImageStyle::Minimal
                    | ImageStyle::Corporate
            ),
            Provider::PhotoRealistic => matches!(
                self,
                ImageStyle::Photographic | ImageStyle::Cinematic | ImageStyle::Natural
            ),
        }
    }

    /// Resolve a requested style token against a provider's accepted set.
    /// Missing, unknown, or foreign tokens coerce to the provider default.
    pub fn resolve(requested: Option<&str>, provider: Provider) -> Self {
        let Some(raw) = requested else {
            return Self::default_for(provider);
        };
        let parsed = match raw.trim().to_lowercase().as_str() {
            "illustration" => Some(ImageStyle::Illustration),
            "vector" => Some(ImageStyle::Vector),
            "minimal" => Some(ImageStyle::Minimal),
            "corporate" => Some(ImageStyle::Corporate),
            "photographic" | "photo" => Some(ImageStyle::Photographic),
            "cinematic" => Some(ImageStyle::Cinematic),
            "natural" => Some(ImageStyle::Natural),
            _ => None,
        };
        match parsed {
            Some(style) if style.valid_for(provider) => style,
            Some(style) => {
                warn!(
                    "Style '{}' is not valid for the {} provider, using '{}'",
                    style.token(),
                    provider.label(),
                    Self::default_for(provider).token()
                );
                Self::default_for(provider)
            }
            None => {
                warn!(
                    "Unknown style '{}', using '{}'",
                    raw,
                    Self::default_for(provider).token()
                );
                Self::default_for(provider)
            }
        }
    }
}

/// Uniform interface to the remote providers.
///
/// Implementations perform exactly one network call per `generate` and do no
/// credit or rate-limit bookkeeping; that is the scheduler's responsibility.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Issue one generation call, returning the URL of the first image
    /// reference on success.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

/// Wire request shared by both providers. The text-capable provider takes an
/// aspect-ratio token; the photo-realistic provider takes explicit pixels.
#[derive(Debug, Serialize)]
pub(crate) struct WireRequest<'a> {
    pub prompt: &'a str,
    pub negative_prompt: &'a str,
    pub style: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireResponse {
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageRef {
    pub url: String,
}

/// Build the provider-specific payload for a request.
pub(crate) fn build_payload(request: &GenerationRequest) -> WireRequest<'_> {
    match request.provider {
        Provider::TextCapable => WireRequest {
            prompt: &request.prompt,
            negative_prompt: &request.negative_prompt,
            style: request.style.token(),
            aspect_ratio: Some(request.aspect_ratio.as_str()),
            width: None,
            height: None,
        },
        Provider::PhotoRealistic => {
            let (width, height) = request.aspect_ratio.dimensions();
            WireRequest {
                prompt: &request.prompt,
                negative_prompt: &request.negative_prompt,
                style: request.style.token(),
                aspect_ratio: None,
                width: Some(width),
                height: Some(height),
            }
        }
    }
}

/// Map a non-success HTTP status to the failure taxonomy.
pub(crate) fn classify_status(status: StatusCode, body: &str) -> GenError {
    let detail = if body.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, body)
    };
    match status.as_u16() {
        401 | 403 => GenError::AuthenticationError(detail),
        429 => GenError::RateLimited(detail),
        400..=499 => GenError::ValidationError(detail),
        _ => GenError::Unavailable(detail),
    }
}

/// Production client that reaches the providers over HTTP.
pub struct HttpGenerationClient {
    client: reqwest::Client,
    config: PipelineConfig,
}

impl HttpGenerationClient {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GenError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let endpoint = self.config.endpoint(request.provider);
        let payload = build_payload(request);

        debug!(
            "Dispatching attempt {} for slide {} to {} provider",
            request.attempt_id,
            request.slide_id,
            request.provider.label()
        );

        let mut builder = self.client.post(endpoint).json(&payload);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let body: WireResponse = response
            .json()
            .await
            .map_err(|e| GenError::MalformedResponse(e.to_string()))?;

        match body.images.first() {
            Some(image) if !image.url.is_empty() => {
                info!(
                    "Attempt {} for slide {} resolved to {}",
                    request.attempt_id, request.slide_id, image.url
                );
                Ok(image.url.clone())
            }
            _ => Err(GenError::MalformedResponse(
                "response contained no image references".to_string(),
            )),
        }
    }
}
