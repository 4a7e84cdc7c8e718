// ABOUTME: Prompt classification for slides
// ABOUTME: Decides text-bearing vs photo-style routing and builds the base prompt

use crate::model::{Slide, SlideKind};
use crate::provider::Provider;
use regex::Regex;

/// Number of body words folded into a derived prompt.
const BODY_PREFIX_WORDS: usize = 18;

/// Slide-kind words that mark a seed as text-bearing when they appear in it.
const KIND_HINTS: [&str; 6] = [
    "timeline",
    "chart",
    "comparison",
    "process",
    "quote",
    "agenda",
];

/// Result of classifying one slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub base_prompt: String,
    /// True when the image must render legible text, diagrams or data labels.
    pub needs_text: bool,
}

impl Classification {
    /// Provider this classification routes to, before any override.
    pub fn provider(&self) -> Provider {
        if self.needs_text {
            Provider::TextCapable
        } else {
            Provider::PhotoRealistic
        }
    }
}

/// Swappable classification strategy.
///
/// Content classification is inherently approximate, so it stays behind a
/// trait: hosts can swap the heuristic out and tests can pin routing without
/// touching network behavior.
pub trait Classifier: Send + Sync {
    /// Pure function of the slide's kind, text and optional prompt override.
    fn classify(&self, slide: &Slide) -> Classification;
}

/// Default classifier: regex cues over the prompt seed.
pub struct HeuristicClassifier {
    year: Regex,
    percent: Regex,
    currency: Regex,
    quote_marks: Regex,
    bullet: Regex,
}

impl HeuristicClassifier {
    pub fn new() -> Self {
        // The patterns are fixed literals; compiling them cannot fail.
        Self {
            year: Regex::new(r"\b(19|20)\d{2}\b").unwrap(),
            percent: Regex::new(r"\d+(\.\d+)?\s*%").unwrap(),
            currency: Regex::new(r"[$€£¥]\s*\d").unwrap(),
            quote_marks: Regex::new(r#"["“”]"#).unwrap(),
            bullet: Regex::new(r"(?m)^\s*[-•*]\s+").unwrap(),
        }
    }

    /// Build the prompt seed: an explicit override verbatim, otherwise the
    /// title plus a bounded prefix of the body.
    fn seed(&self, slide: &Slide) -> String {
        if let Some(prompt) = &slide.image_prompt {
            let prompt = prompt.trim();
            if !prompt.is_empty() {
                return prompt.to_string();
            }
        }

        let title = slide.title.trim();
        let prefix: Vec<&str> = slide
            .body
            .split_whitespace()
            .take(BODY_PREFIX_WORDS)
            .collect();

        if prefix.is_empty() {
            title.to_string()
        } else if title.is_empty() {
            prefix.join(" ")
        } else {
            format!("{}. {}", title, prefix.join(" "))
        }
    }

    fn has_text_cue(&self, seed: &str, kind: SlideKind) -> bool {
        if kind.is_cover() {
            return true;
        }
        let lowered = seed.to_lowercase();
        if KIND_HINTS.contains(&kind.label()) {
            return true;
        }
        if KIND_HINTS.iter().any(|hint| lowered.contains(hint)) {
            return true;
        }
        self.year.is_match(seed)
            || self.percent.is_match(seed)
            || self.currency.is_match(seed)
            || self.quote_marks.is_match(seed)
            || self.bullet.is_match(seed)
    }
}

impl Default for HeuristicClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for HeuristicClassifier {
    fn classify(&self, slide: &Slide) -> Classification {
        let seed = self.seed(slide);
        let needs_text = self.has_text_cue(&seed, slide.kind);
        Classification {
            base_prompt: seed,
            needs_text,
        }
    }
}
