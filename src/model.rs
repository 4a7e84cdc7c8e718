// ABOUTME: Data model for slides and generation attempts
// ABOUTME: Defines slide archetypes, image states and the per-attempt request

use crate::provider::{ImageStyle, Provider};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of slide archetypes produced by the content generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideKind {
    Title,
    Content,
    Quote,
    Chart,
    Image,
    Timeline,
    Comparison,
    Process,
    Agenda,
}

impl SlideKind {
    /// Kinds whose imagery must carry legible text regardless of content cues.
    pub fn is_cover(&self) -> bool {
        matches!(self, SlideKind::Title | SlideKind::Agenda)
    }

    /// Lowercase label used as a classification cue and in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            SlideKind::Title => "title",
            SlideKind::Content => "content",
            SlideKind::Quote => "quote",
            SlideKind::Chart => "chart",
            SlideKind::Image => "image",
            SlideKind::Timeline => "timeline",
            SlideKind::Comparison => "comparison",
            SlideKind::Process => "process",
            SlideKind::Agenda => "agenda",
        }
    }
}

/// Lifecycle of a slide's image.
///
/// Only advances `Pending -> Loading -> {Ready, Failed}`; an explicit
/// regenerate request is the one path back from `Ready` to `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageState {
    Pending,
    Loading,
    Ready,
    Failed,
}

/// One slide of a presentation document.
///
/// Owned by the presentation document; once generation starts it is mutated
/// only through the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    /// Opaque identifier, unique within a presentation.
    pub id: String,
    pub kind: SlideKind,
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Explicit prompt override; wins over title/body derivation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default = "default_image_state")]
    pub image_state: ImageState,
}

fn default_image_state() -> ImageState {
    ImageState::Pending
}

impl Slide {
    pub fn new(id: impl Into<String>, kind: SlideKind, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            body: String::new(),
            image_prompt: None,
            image_url: None,
            image_state: ImageState::Pending,
        }
    }

    /// Whether this slide still needs an image resolved.
    pub fn needs_image(&self) -> bool {
        self.image_state != ImageState::Ready
    }

    // The three mark_* helpers are the only mutation points for the
    // state/url pair, keeping `image_url` set iff the state is Ready.

    pub fn mark_loading(&mut self) {
        self.image_state = ImageState::Loading;
        self.image_url = None;
    }

    pub fn mark_ready(&mut self, url: String) {
        self.image_url = Some(url);
        self.image_state = ImageState::Ready;
    }

    pub fn mark_failed(&mut self) {
        self.image_url = None;
        self.image_state = ImageState::Failed;
    }
}

/// Aspect ratio requested from a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    Widescreen,
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "1:1")]
    Square,
}

impl Default for AspectRatio {
    fn default() -> Self {
        AspectRatio::Widescreen
    }
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Standard => "4:3",
            AspectRatio::Square => "1:1",
        }
    }

    /// Explicit pixel dimensions for providers that take width/height.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            AspectRatio::Widescreen => (1280, 720),
            AspectRatio::Standard => (1024, 768),
            AspectRatio::Square => (1024, 1024),
        }
    }
}

/// Ephemeral request created per generation attempt.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub slide_id: String,
    /// Per-attempt id, used to correlate log lines across retries.
    pub attempt_id: Uuid,
    pub prompt: String,
    pub negative_prompt: String,
    pub provider: Provider,
    pub style: ImageStyle,
    pub aspect_ratio: AspectRatio,
}

impl GenerationRequest {
    pub fn new(
        slide_id: impl Into<String>,
        prompt: impl Into<String>,
        provider: Provider,
        style: ImageStyle,
    ) -> Self {
        Self {
            slide_id: slide_id.into(),
            attempt_id: Uuid::new_v4(),
            prompt: prompt.into(),
            negative_prompt: default_negative_prompt().to_string(),
            provider,
            style,
            aspect_ratio: AspectRatio::default(),
        }
    }
}

/// Negative prompt sent with every request; keeps decks free of the usual
/// generation artifacts.
pub fn default_negative_prompt() -> &'static str {
    "blurry, low quality, distorted, watermark, signature"
}
