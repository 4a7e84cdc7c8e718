// ABOUTME: Slide image scheduler orchestrating the generation pipeline
// ABOUTME: Runs a synchronous priority phase, then a detached background phase

use crate::classify::{Classifier, HeuristicClassifier};
use crate::config::PipelineConfig;
use crate::credits::CreditLedger;
use crate::enhance::PromptEnhancer;
use crate::errors::{GenError, Result};
use crate::fallback::FallbackImageProvider;
use crate::model::{GenerationRequest, ImageState, Slide};
use crate::provider::{GenerationClient, ImageStyle};
use crate::ratelimit::RateLimiter;
use log::{info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Slide list shared between the collaborator (reader) and the scheduler
/// (writer). Lock is never held across an await.
pub type SharedSlides = Arc<Mutex<Vec<Slide>>>;

/// One observed state transition, published as each slide resolves.
#[derive(Debug, Clone)]
pub struct SlideUpdate {
    pub slide_id: String,
    pub state: ImageState,
    pub image_url: Option<String>,
}

/// Observable status of the detached background phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundStatus {
    Running,
    Completed { successes: usize },
}

/// Handle to the background phase returned by `run`.
///
/// The phase keeps running whether or not the handle is polled; dropping it
/// does not cancel generation.
pub struct BackgroundTask {
    status: watch::Receiver<BackgroundStatus>,
    handle: JoinHandle<()>,
}

impl BackgroundTask {
    /// Current status snapshot.
    pub fn status(&self) -> BackgroundStatus {
        *self.status.borrow()
    }

    /// Wait for the background phase to drain; returns the count of real
    /// provider successes across the whole run.
    pub async fn wait(self) -> usize {
        let _ = self.handle.await;
        match *self.status.borrow() {
            BackgroundStatus::Completed { successes } => successes,
            BackgroundStatus::Running => 0,
        }
    }
}

/// Orchestrates classification, enhancement, budgeting, rate limiting and
/// provider calls across a batch of slides.
#[derive(Clone)]
pub struct SlideImageScheduler {
    classifier: Arc<dyn Classifier>,
    enhancer: PromptEnhancer,
    client: Arc<dyn GenerationClient>,
    ledger: CreditLedger,
    limiter: RateLimiter,
    fallback: FallbackImageProvider,
    config: PipelineConfig,
    updates: mpsc::UnboundedSender<SlideUpdate>,
    // One generation attempt in flight at a time, across both phases and
    // regenerate. The reserve/commit pair spans the provider await, so two
    // overlapping attempts could each see the last credit and double-spend.
    in_flight: Arc<AsyncMutex<()>>,
}

impl SlideImageScheduler {
    /// Build a scheduler and the channel on which per-slide transitions are
    /// published. The ledger and limiter are injected so a host can run
    /// multiple independent sessions and share the counters with its UI.
    pub fn new(
        config: PipelineConfig,
        client: Arc<dyn GenerationClient>,
        ledger: CreditLedger,
        limiter: RateLimiter,
    ) -> (Self, mpsc::UnboundedReceiver<SlideUpdate>) {
        let (updates, receiver) = mpsc::unbounded_channel();
        let enhancer = PromptEnhancer::new(config.enhance_min_chars);
        let scheduler = Self {
            classifier: Arc::new(HeuristicClassifier::new()),
            enhancer,
            client,
            ledger,
            limiter,
            fallback: FallbackImageProvider::new(),
            config,
            updates,
            in_flight: Arc::new(AsyncMutex::new(())),
        };
        (scheduler, receiver)
    }

    /// Swap in an alternative classification strategy.
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Swap in an alternative placeholder pool.
    pub fn with_fallback(mut self, fallback: FallbackImageProvider) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn ledger(&self) -> &CreditLedger {
        &self.ledger
    }

    /// Process a batch of slides. The first `priority_count` slides needing
    /// generation are resolved before this returns; the remainder continue
    /// as a detached background sequence reachable through the returned
    /// handle. Only `Pending` slides are scheduled: `Ready` slides keep
    /// their image and `Failed` slides wait for an explicit `regenerate`.
    pub async fn run(&self, slides: SharedSlides, priority_count: usize) -> BackgroundTask {
        let pending_ids: Vec<String> = {
            let guard = slides.lock();
            guard
                .iter()
                .filter(|s| s.image_state == ImageState::Pending)
                .map(|s| s.id.clone())
                .collect()
        };

        let split = priority_count.min(pending_ids.len());
        let (priority, background) = pending_ids.split_at(split);
        info!(
            "Scheduling {} slide image(s): {} priority, {} background",
            pending_ids.len(),
            priority.len(),
            background.len()
        );

        let mut successes = 0usize;
        for id in priority {
            if self.process_slide(&slides, id).await {
                successes += 1;
            }
        }

        let (status_tx, status_rx) = watch::channel(BackgroundStatus::Running);
        let scheduler = self.clone();
        let background: Vec<String> = background.to_vec();
        let background_slides = slides.clone();

        let handle = tokio::spawn(async move {
            let mut total = successes;
            for id in background {
                // Fixed pause between dispatches, on top of any delay the
                // rate limiter imposes, to smooth bursts.
                tokio::time::sleep(scheduler.config.inter_request_delay()).await;
                if scheduler.process_slide(&background_slides, &id).await {
                    total += 1;
                }
            }
            info!(
                "Background image generation drained with {} provider success(es)",
                total
            );
            let _ = status_tx.send(BackgroundStatus::Completed { successes: total });
        });

        BackgroundTask {
            status: status_rx,
            handle,
        }
    }

    /// Re-run the per-slide algorithm for one slide, typically already
    /// `Ready`. A slide currently `Loading` has a request in flight and is
    /// rejected rather than doubled up. Returns whether a real provider
    /// success occurred.
    pub async fn regenerate(&self, slides: &SharedSlides, slide_id: &str) -> Result<bool> {
        {
            let guard = slides.lock();
            let slide = guard
                .iter()
                .find(|s| s.id == slide_id)
                .ok_or_else(|| GenError::SlideError(format!("unknown slide id: {}", slide_id)))?;
            if slide.image_state == ImageState::Loading {
                return Err(GenError::SlideError(format!(
                    "slide {} already has a request in flight",
                    slide_id
                )));
            }
        }
        Ok(self.process_slide(slides, slide_id).await)
    }

    /// The per-slide algorithm shared by both phases and by `regenerate`.
    /// Every path terminates in a resolved state; returns true only for a
    /// confirmed provider success.
    async fn process_slide(&self, slides: &SharedSlides, slide_id: &str) -> bool {
        let _in_flight = self.in_flight.lock().await;

        let snapshot = {
            let mut guard = slides.lock();
            let Some(slide) = guard.iter_mut().find(|s| s.id == slide_id) else {
                warn!("Slide {} disappeared before generation", slide_id);
                return false;
            };
            slide.mark_loading();
            slide.clone()
        };
        self.publish(slide_id, ImageState::Loading, None);

        let classification = self.classifier.classify(&snapshot);
        if classification.base_prompt.trim().is_empty() {
            // Nothing to prompt with and nothing stable to seed a
            // placeholder against; this is the one unresolvable case.
            warn!("Slide {} has no usable text, marking failed", slide_id);
            self.finish_failed(slides, slide_id);
            return false;
        }

        let provider = self
            .config
            .provider_override
            .unwrap_or_else(|| classification.provider());
        let prompt = self.enhancer.enhance(&classification.base_prompt, provider);
        let style = ImageStyle::resolve(self.config.style.as_deref(), provider);
        let request = GenerationRequest::new(slide_id, prompt, provider, style);

        if !self.ledger.try_reserve(1) {
            info!(
                "Slide {} skipped generation: {}",
                slide_id,
                GenError::CreditsExhausted
            );
            let url = self.fallback.fallback(&request.prompt);
            self.finish_ready(slides, slide_id, url);
            return false;
        }

        self.limiter.acquire(provider).await;
        match self.client.generate(&request).await {
            Ok(url) => {
                self.ledger.commit(1);
                self.finish_ready(slides, slide_id, url);
                true
            }
            Err(err) if err.is_retryable() => {
                warn!(
                    "Slide {} hit the provider rate limit, retrying once: {}",
                    slide_id, err
                );
                tokio::time::sleep(self.config.retry_backoff()).await;
                self.limiter.acquire(provider).await;
                let retry = GenerationRequest {
                    attempt_id: Uuid::new_v4(),
                    ..request.clone()
                };
                match self.client.generate(&retry).await {
                    Ok(url) => {
                        self.ledger.commit(1);
                        self.finish_ready(slides, slide_id, url);
                        true
                    }
                    Err(err) => {
                        warn!("Retry for slide {} failed, using placeholder: {}", slide_id, err);
                        let url = self.fallback.fallback(&request.prompt);
                        self.finish_ready(slides, slide_id, url);
                        false
                    }
                }
            }
            Err(err) => {
                warn!(
                    "Generation for slide {} failed, using placeholder: {}",
                    slide_id, err
                );
                let url = self.fallback.fallback(&request.prompt);
                self.finish_ready(slides, slide_id, url);
                false
            }
        }
    }

    fn finish_ready(&self, slides: &SharedSlides, slide_id: &str, url: String) {
        {
            let mut guard = slides.lock();
            if let Some(slide) = guard.iter_mut().find(|s| s.id == slide_id) {
                slide.mark_ready(url.clone());
            }
        }
        self.publish(slide_id, ImageState::Ready, Some(url));
    }

    fn finish_failed(&self, slides: &SharedSlides, slide_id: &str) {
        {
            let mut guard = slides.lock();
            if let Some(slide) = guard.iter_mut().find(|s| s.id == slide_id) {
                slide.mark_failed();
            }
        }
        self.publish(slide_id, ImageState::Failed, None);
    }

    // Observers may have gone away; a closed channel is not an error.
    fn publish(&self, slide_id: &str, state: ImageState, image_url: Option<String>) {
        let _ = self.updates.send(SlideUpdate {
            slide_id: slide_id.to_string(),
            state,
            image_url,
        });
    }
}
