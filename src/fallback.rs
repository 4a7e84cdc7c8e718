// ABOUTME: Deterministic placeholder images for skipped or failed generation
// ABOUTME: Hashes the prompt seed into a fixed pool of placeholder URLs

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Seeded placeholder references handed out when generation is skipped
/// (budget exhausted) or fails. The pool covers common deck moods so
/// neighbouring slides rarely repeat.
const DEFAULT_POOL: [&str; 8] = [
    "https://picsum.photos/seed/slidegen-gradient/1280/720",
    "https://picsum.photos/seed/slidegen-skyline/1280/720",
    "https://picsum.photos/seed/slidegen-workspace/1280/720",
    "https://picsum.photos/seed/slidegen-abstract/1280/720",
    "https://picsum.photos/seed/slidegen-nature/1280/720",
    "https://picsum.photos/seed/slidegen-texture/1280/720",
    "https://picsum.photos/seed/slidegen-geometry/1280/720",
    "https://picsum.photos/seed/slidegen-horizon/1280/720",
];

/// Deterministic placeholder selection: identical seed text always yields the
/// identical URL within a session. Never fails.
#[derive(Clone)]
pub struct FallbackImageProvider {
    pool: Vec<String>,
}

impl FallbackImageProvider {
    pub fn new() -> Self {
        Self {
            pool: DEFAULT_POOL.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Use a custom placeholder pool. Empty pools are rejected by falling
    /// back to the default set so `fallback` can always succeed.
    pub fn with_pool(pool: Vec<String>) -> Self {
        if pool.is_empty() {
            Self::new()
        } else {
            Self { pool }
        }
    }

    /// Select a placeholder URL for the given prompt or seed text.
    pub fn fallback(&self, seed: &str) -> String {
        let mut hasher = DefaultHasher::new();
        seed.hash(&mut hasher);
        let index = (hasher.finish() % self.pool.len() as u64) as usize;
        self.pool[index].clone()
    }
}

impl Default for FallbackImageProvider {
    fn default() -> Self {
        Self::new()
    }
}
