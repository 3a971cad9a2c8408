//! Entity extraction from prescription text.
//!
//! Pipeline per line: Noise Filter → Name Matcher → Pattern Library →
//! Entity Accumulator. A name match opens a new medicine and is stripped from
//! the line; details on that line and every following line belong to the
//! open medicine until the next match.

mod accumulator;
mod matcher;
mod noise;
mod patterns;

pub use accumulator::*;
pub use matcher::*;
pub use noise::*;
pub use patterns::*;

use tracing::trace;

use crate::models::MedicineEntity;

/// Coordinates the noise filter, name matcher and pattern library.
#[derive(Debug, Clone, Default)]
pub struct EntityExtractor {
    noise: NoiseFilter,
    matcher: NameMatcher,
    patterns: PatternLibrary,
}

impl EntityExtractor {
    /// Create an extractor with the built-in dictionary, markers and patterns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor from explicit components.
    pub fn from_parts(noise: NoiseFilter, matcher: NameMatcher, patterns: PatternLibrary) -> Self {
        Self {
            noise,
            matcher,
            patterns,
        }
    }

    /// Extract medicines using this extractor's dictionary.
    pub fn extract(&self, text: &str) -> Vec<MedicineEntity> {
        self.extract_with(text, &self.matcher)
    }

    /// Extract medicines using a caller-provided matcher (e.g. a per-call
    /// extended dictionary).
    pub fn extract_with(&self, text: &str, matcher: &NameMatcher) -> Vec<MedicineEntity> {
        let mut acc = EntityAccumulator::new();

        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }
            if self.noise.is_noise(line) {
                trace!(line, "dropping noise line");
                continue;
            }

            let detail_line = match matcher.find(line) {
                Some(hit) => {
                    acc.open(&hit.canonical);
                    hit.strip_from(line)
                }
                None => line.to_string(),
            };

            if let Some(current) = acc.current_mut() {
                self.patterns.extract_into(&detail_line, current);
            }
        }

        acc.finish()
    }

    /// Get the name matcher for direct access.
    pub fn matcher(&self) -> &NameMatcher {
        &self.matcher
    }
}
