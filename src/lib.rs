// ABOUTME: Library module for the slidegen pipeline.
// ABOUTME: Turns slide descriptions into images via remote providers with fallback.

// Reexport modules
pub mod classify;
pub mod config;
pub mod credits;
pub mod enhance;
pub mod errors;
pub mod fallback;
pub mod model;
pub mod provider;
pub mod ratelimit;
pub mod scheduler;

// Reexport common types
pub use classify::{Classification, Classifier, HeuristicClassifier};
pub use config::PipelineConfig;
pub use credits::CreditLedger;
pub use enhance::PromptEnhancer;
pub use errors::{GenError, Result};
pub use fallback::FallbackImageProvider;
pub use model::{AspectRatio, GenerationRequest, ImageState, Slide, SlideKind};
pub use provider::{GenerationClient, HttpGenerationClient, ImageStyle, Provider};
pub use ratelimit::RateLimiter;
pub use scheduler::{
    BackgroundStatus, BackgroundTask, SharedSlides, SlideImageScheduler, SlideUpdate,
};

#[cfg(test)]
mod tests;
