use super::*;
use crate::provider::{build_payload, classify_status};
use reqwest::StatusCode;
use std::time::Duration;

fn slide(id: &str, kind: SlideKind, title: &str, body: &str) -> Slide {
    let mut slide = Slide::new(id, kind, title);
    slide.body = body.to_string();
    slide
}

fn long_prompt(topic: &str) -> String {
    format!(
        "A detailed wide-angle scene showing {} with a large team collaborating \
         around a table, whiteboards covered in sticky notes, large windows, \
         morning light and a city skyline visible in the background",
        topic
    )
}

// ---- classifier ----

#[test]
fn test_classify_numeric_content_routes_to_text_provider() {
    let classifier = HeuristicClassifier::new();
    let slide = slide(
        "s1",
        SlideKind::Content,
        "Q3 Revenue Growth",
        "Revenue grew 42% quarter over quarter",
    );

    let classification = classifier.classify(&slide);
    assert!(classification.needs_text);
    assert_eq!(classification.provider(), Provider::TextCapable);
}

#[test]
fn test_classify_photo_content_routes_to_photo_provider() {
    let classifier = HeuristicClassifier::new();
    let slide = slide(
        "s2",
        SlideKind::Content,
        "Team Offsite Photo",
        "Our team enjoying the annual retreat in the mountains",
    );

    let classification = classifier.classify(&slide);
    assert!(!classification.needs_text);
    assert_eq!(classification.provider(), Provider::PhotoRealistic);
}

#[test]
fn test_classify_explicit_prompt_used_verbatim() {
    let classifier = HeuristicClassifier::new();
    let mut slide = slide("s3", SlideKind::Content, "Ignored Title", "ignored body");
    slide.image_prompt = Some("a lighthouse at dawn".to_string());

    let classification = classifier.classify(&slide);
    assert_eq!(classification.base_prompt, "a lighthouse at dawn");
}

#[test]
fn test_classify_title_slide_always_needs_text() {
    let classifier = HeuristicClassifier::new();
    let slide = slide("s4", SlideKind::Title, "Welcome", "");

    assert!(classifier.classify(&slide).needs_text);
}

#[test]
fn test_classify_kind_hint_needs_text() {
    let classifier = HeuristicClassifier::new();
    let slide = slide("s5", SlideKind::Chart, "Our trajectory", "up and to the right");

    assert!(classifier.classify(&slide).needs_text);
}

#[test]
fn test_classify_year_and_quote_cues() {
    let classifier = HeuristicClassifier::new();

    let with_year = slide("s6", SlideKind::Content, "Our history", "Founded in 2014 in a garage");
    assert!(classifier.classify(&with_year).needs_text);

    let with_quote = slide(
        "s7",
        SlideKind::Content,
        "What customers say",
        "\"This changed how we work\" said one user",
    );
    assert!(classifier.classify(&with_quote).needs_text);
}

#[test]
fn test_classify_bounds_body_prefix() {
    let classifier = HeuristicClassifier::new();
    let body = (0..50).map(|i| format!("word{}", i)).collect::<Vec<_>>().join(" ");
    let slide = slide("s8", SlideKind::Content, "Long one", &body);

    let classification = classifier.classify(&slide);
    assert!(classification.base_prompt.contains("word17"));
    assert!(!classification.base_prompt.contains("word18"));
}

#[test]
fn test_classify_empty_slide_yields_empty_prompt() {
    let classifier = HeuristicClassifier::new();
    let slide = slide("s9", SlideKind::Content, "", "");

    assert!(classifier.classify(&slide).base_prompt.is_empty());
}

// ---- enhancer ----

#[test]
fn test_enhance_short_prompt_unchanged() {
    let enhancer = PromptEnhancer::new(150);
    let prompt = "a minimalist red circle";

    assert_eq!(enhancer.enhance(prompt, Provider::TextCapable), prompt);
    assert_eq!(enhancer.enhance(prompt, Provider::PhotoRealistic), prompt);
}

#[test]
fn test_enhance_appends_text_provider_modifiers() {
    let enhancer = PromptEnhancer::new(150);
    let enhanced = enhancer.enhance(&long_prompt("a product roadmap"), Provider::TextCapable);

    assert!(enhanced.contains("clean vector illustration style"));
    assert!(enhanced.contains("high quality"));
    assert!(enhanced.contains("suitable for a professional presentation"));
}

#[test]
fn test_enhance_appends_photo_provider_modifiers() {
    let enhancer = PromptEnhancer::new(150);
    let enhanced = enhancer.enhance(&long_prompt("an office party"), Provider::PhotoRealistic);

    assert!(enhanced.contains("photorealistic"));
    assert!(enhanced.contains("high resolution"));
    // The base prompt already mentions light, but "lighting" itself is absent.
    assert!(enhanced.contains("soft natural lighting"));
}

#[test]
fn test_enhance_skips_modifiers_already_present() {
    let enhancer = PromptEnhancer::new(150);
    let prompt = format!("{}, rendered as a high quality illustration", long_prompt("a launch plan"));
    let enhanced = enhancer.enhance(&prompt, Provider::TextCapable);

    assert_eq!(enhanced.matches("illustration").count(), 1);
    assert_eq!(enhanced.matches("high quality").count(), 1);
}

#[test]
fn test_enhance_strips_denylist_for_photo_provider() {
    let enhancer = PromptEnhancer::new(150);
    let prompt = format!("{} next to a WAR memorial and a gun display", long_prompt("a museum"));

    let photo = enhancer.enhance(&prompt, Provider::PhotoRealistic);
    assert!(!photo.to_lowercase().contains("war"));
    assert!(!photo.to_lowercase().contains("gun"));

    // The text-capable provider is not filtered.
    let text = enhancer.enhance(&prompt, Provider::TextCapable);
    assert!(text.contains("WAR memorial"));
}

#[test]
fn test_enhance_denylist_is_whole_word() {
    let enhancer = PromptEnhancer::new(150);
    let prompt = format!("{} in gunmetal gray and warm tones", long_prompt("a server room"));

    let enhanced = enhancer.enhance(&prompt, Provider::PhotoRealistic);
    assert!(enhanced.contains("gunmetal"));
    assert!(enhanced.contains("warm"));
}

// ---- credit ledger ----

#[test]
fn test_ledger_reserve_does_not_spend() {
    let ledger = CreditLedger::new(5);
    assert!(ledger.try_reserve(1));
    assert_eq!(ledger.remaining(), 5);
}

#[test]
fn test_ledger_commit_decrements_and_floors_at_zero() {
    let ledger = CreditLedger::new(2);
    ledger.commit(1);
    assert_eq!(ledger.remaining(), 1);
    ledger.commit(5);
    assert_eq!(ledger.remaining(), 0);
}

#[test]
fn test_ledger_denies_when_exhausted_and_resets() {
    let ledger = CreditLedger::new(1);
    ledger.commit(1);
    assert!(!ledger.try_reserve(1));

    ledger.reset();
    assert_eq!(ledger.remaining(), 1);
    assert!(ledger.try_reserve(1));
}

#[test]
fn test_ledger_commits_never_exceed_budget() {
    let ledger = CreditLedger::new(3);
    let mut commits = 0;
    for _ in 0..10 {
        if ledger.try_reserve(1) {
            ledger.commit(1);
            commits += 1;
        }
    }
    assert_eq!(commits, 3);
    assert_eq!(ledger.remaining(), 0);
}

// ---- rate limiter ----

#[test]
fn test_rate_limiter_admits_up_to_limit() {
    let limiter = RateLimiter::new(3, Duration::from_secs(60));
    for _ in 0..3 {
        assert_eq!(limiter.admit(Provider::TextCapable), Duration::ZERO);
    }
    let wait = limiter.admit(Provider::TextCapable);
    assert!(wait > Duration::ZERO);
    assert!(wait <= Duration::from_secs(60));
}

#[test]
fn test_rate_limiter_windows_are_independent_per_provider() {
    let limiter = RateLimiter::new(1, Duration::from_secs(60));
    assert_eq!(limiter.admit(Provider::TextCapable), Duration::ZERO);
    assert!(limiter.admit(Provider::TextCapable) > Duration::ZERO);
    assert_eq!(limiter.admit(Provider::PhotoRealistic), Duration::ZERO);
}

#[test]
fn test_rate_limiter_window_resets_after_elapse() {
    let limiter = RateLimiter::new(1, Duration::from_millis(30));
    assert_eq!(limiter.admit(Provider::PhotoRealistic), Duration::ZERO);
    assert!(limiter.admit(Provider::PhotoRealistic) > Duration::ZERO);

    std::thread::sleep(Duration::from_millis(40));
    assert_eq!(limiter.admit(Provider::PhotoRealistic), Duration::ZERO);
}

// ---- fallback provider ----

#[test]
fn test_fallback_is_deterministic() {
    let provider = FallbackImageProvider::new();
    let first = provider.fallback("quarterly revenue chart");
    let second = provider.fallback("quarterly revenue chart");
    assert_eq!(first, second);
}

#[test]
fn test_fallback_custom_pool() {
    let provider =
        FallbackImageProvider::with_pool(vec!["https://example.com/only.png".to_string()]);
    assert_eq!(provider.fallback("anything"), "https://example.com/only.png");
}

#[test]
fn test_fallback_empty_pool_uses_defaults() {
    let provider = FallbackImageProvider::with_pool(Vec::new());
    assert!(provider.fallback("seed").starts_with("https://"));
}

// ---- styles ----

#[test]
fn test_style_resolution() {
    assert_eq!(
        ImageStyle::resolve(Some("vector"), Provider::TextCapable),
        ImageStyle::Vector
    );
    // Unknown token coerces to the provider default.
    assert_eq!(
        ImageStyle::resolve(Some("vaporwave"), Provider::TextCapable),
        ImageStyle::Illustration
    );
    // A style valid only for the other provider also coerces.
    assert_eq!(
        ImageStyle::resolve(Some("vector"), Provider::PhotoRealistic),
        ImageStyle::Photographic
    );
    assert_eq!(
        ImageStyle::resolve(None, Provider::PhotoRealistic),
        ImageStyle::Photographic
    );
}

// ---- wire payloads ----

#[test]
fn test_payload_for_text_provider_uses_aspect_ratio() {
    let request = GenerationRequest::new(
        "s1",
        "a timeline",
        Provider::TextCapable,
        ImageStyle::Illustration,
    );
    let payload = build_payload(&request);
    let json = serde_json::to_value(&payload).expect("payload serializes");

    assert_eq!(json["aspect_ratio"], "16:9");
    assert_eq!(json["style"], "illustration");
    assert!(json.get("width").is_none());
    assert!(json.get("height").is_none());
}

#[test]
fn test_payload_for_photo_provider_uses_dimensions() {
    let request = GenerationRequest::new(
        "s1",
        "a forest",
        Provider::PhotoRealistic,
        ImageStyle::Photographic,
    );
    let payload = build_payload(&request);
    let json = serde_json::to_value(&payload).expect("payload serializes");

    assert_eq!(json["width"], 1280);
    assert_eq!(json["height"], 720);
    assert!(json.get("aspect_ratio").is_none());
}

#[test]
fn test_status_classification() {
    assert!(matches!(
        classify_status(StatusCode::UNAUTHORIZED, ""),
        GenError::AuthenticationError(_)
    ));
    assert!(matches!(
        classify_status(StatusCode::FORBIDDEN, ""),
        GenError::AuthenticationError(_)
    ));
    assert!(matches!(
        classify_status(StatusCode::BAD_REQUEST, "bad prompt"),
        GenError::ValidationError(_)
    ));
    assert!(matches!(
        classify_status(StatusCode::UNPROCESSABLE_ENTITY, ""),
        GenError::ValidationError(_)
    ));
    assert!(matches!(
        classify_status(StatusCode::TOO_MANY_REQUESTS, ""),
        GenError::RateLimited(_)
    ));
    assert!(matches!(
        classify_status(StatusCode::INTERNAL_SERVER_ERROR, ""),
        GenError::Unavailable(_)
    ));
    assert!(matches!(
        classify_status(StatusCode::SERVICE_UNAVAILABLE, ""),
        GenError::Unavailable(_)
    ));
}

#[test]
fn test_retryability() {
    assert!(GenError::RateLimited("429".to_string()).is_retryable());
    assert!(!GenError::AuthenticationError("401".to_string()).is_retryable());
    assert!(!GenError::ValidationError("400".to_string()).is_retryable());
    assert!(!GenError::Unavailable("timeout".to_string()).is_retryable());
    assert!(!GenError::MalformedResponse("empty".to_string()).is_retryable());
}

// ---- slide state helpers ----

#[test]
fn test_slide_url_set_iff_ready() {
    let mut slide = Slide::new("s1", SlideKind::Content, "A slide");
    assert_eq!(slide.image_state, ImageState::Pending);
    assert!(slide.image_url.is_none());

    slide.mark_loading();
    assert!(slide.image_url.is_none());

    slide.mark_ready("https://example.com/img.png".to_string());
    assert_eq!(slide.image_state, ImageState::Ready);
    assert!(slide.image_url.is_some());
    assert!(!slide.needs_image());

    slide.mark_loading();
    assert!(slide.image_url.is_none());

    slide.mark_failed();
    assert_eq!(slide.image_state, ImageState::Failed);
    assert!(slide.image_url.is_none());
}

#[test]
fn test_slide_document_round_trip() {
    let mut slide = Slide::new("s1", SlideKind::Chart, "Revenue");
    slide.body = "Up 42% this quarter".to_string();
    slide.mark_ready("https://example.com/chart.png".to_string());

    let json = serde_json::to_string(&vec![slide]).expect("serializes");
    let parsed: Vec<Slide> = serde_json::from_str(&json).expect("parses");
    assert_eq!(parsed[0].kind, SlideKind::Chart);
    assert_eq!(parsed[0].image_state, ImageState::Ready);
    assert_eq!(
        parsed[0].image_url.as_deref(),
        Some("https://example.com/chart.png")
    );
}

#[test]
fn test_config_defaults_and_endpoints() {
    let config = PipelineConfig::default();
    assert_eq!(config.credit_budget, 20);
    assert_eq!(config.priority_count, 2);
    assert_eq!(config.enhance_min_chars, 150);
    assert_eq!(
        config.endpoint(Provider::TextCapable),
        config.text_endpoint.as_str()
    );
    assert_eq!(
        config.endpoint(Provider::PhotoRealistic),
        config.photo_endpoint.as_str()
    );
}
