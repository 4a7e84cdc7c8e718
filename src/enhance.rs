// ABOUTME: Prompt enhancement for generation requests
// ABOUTME: Appends provider-appropriate style modifiers and strips denied terms

use crate::provider::Provider;
use regex::Regex;

/// Modifier phrases keyed by the word whose presence suppresses them.
const TEXT_MODIFIERS: [(&str, &str); 3] = [
    ("illustration", "clean vector illustration style"),
    ("quality", "high quality"),
    ("presentation", "suitable for a professional presentation"),
];

const PHOTO_MODIFIERS: [(&str, &str); 3] = [
    ("photorealistic", "photorealistic"),
    ("resolution", "high resolution"),
    ("lighting", "soft natural lighting"),
];

/// Terms the photo-realistic provider refuses to render; stripped whole-word
/// before enhancement. The text-capable provider tolerates a broader
/// vocabulary and is not filtered.
const DENYLIST: [&str; 10] = [
    "weapon", "gun", "knife", "blood", "violence", "war", "death", "drugs", "explosion", "nude",
];

/// Appends quality/style modifiers to substantive prompts and strips the
/// denylist for the photo-realistic provider. Pure; short prompts pass
/// through untouched so deliberate minimal prompts are not diluted.
#[derive(Clone)]
pub struct PromptEnhancer {
    min_chars: usize,
    denylist: Regex,
}

impl PromptEnhancer {
    pub fn new(min_chars: usize) -> Self {
        let pattern = format!(r"(?i)\b({})\b", DENYLIST.join("|"));
        // Fixed literal alternation; compiling cannot fail.
        Self {
            min_chars,
            denylist: Regex::new(&pattern).unwrap(),
        }
    }

    pub fn enhance(&self, base_prompt: &str, provider: Provider) -> String {
        if base_prompt.chars().count() < self.min_chars {
            return base_prompt.to_string();
        }

        let prompt = match provider {
            Provider::TextCapable => base_prompt.to_string(),
            Provider::PhotoRealistic => self.strip_denied(base_prompt),
        };

        let modifiers = match provider {
            Provider::TextCapable => &TEXT_MODIFIERS,
            Provider::PhotoRealistic => &PHOTO_MODIFIERS,
        };

        let lowered = prompt.to_lowercase();
        let mut enhanced = prompt.clone();
        for (keyword, phrase) in modifiers {
            if !lowered.contains(keyword) {
                enhanced.push_str(", ");
                enhanced.push_str(phrase);
            }
        }
        enhanced
    }

    /// Remove denied terms whole-word, then collapse the whitespace the
    /// removal leaves behind.
    fn strip_denied(&self, prompt: &str) -> String {
        let stripped = self.denylist.replace_all(prompt, "");
        let collapsed: Vec<&str> = stripped.split_whitespace().collect();
        collapsed.join(" ")
    }
}
