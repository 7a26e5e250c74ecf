//! Assessment matching over extracted slide text.

use crate::types::{AssessmentRecord, SlideDeck};

/// Default prefix that identifies an assessment text box.
pub const DEFAULT_PREFIX: &str = "Assessment";

/// Finds assessment text on slides by literal prefix match.
///
/// A shape matches when its text, after trimming surrounding whitespace,
/// starts with the configured prefix. Matching is case-sensitive:
/// `"assessment"` does not match the default prefix.
#[derive(Debug, Clone)]
pub struct AssessmentExtractor {
    prefix: String,
}

impl Default for AssessmentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl AssessmentExtractor {
    /// Create an extractor with the default `"Assessment"` prefix.
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_PREFIX)
    }

    /// Create an extractor matching a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The prefix this extractor matches.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Check whether a single shape text matches.
    pub fn matches(&self, text: &str) -> bool {
        text.trim().starts_with(&self.prefix)
    }

    /// Collect all matching shape texts from a deck.
    ///
    /// Records come out in slide order, then in shape document order within
    /// each slide. Each record carries the slide's 1-based number and the
    /// trimmed shape text.
    pub fn extract(&self, deck: &SlideDeck) -> Vec<AssessmentRecord> {
        let mut records = Vec::new();
        for slide in &deck.slides {
            for text in &slide.texts {
                if self.matches(text) {
                    records.push(AssessmentRecord::new(slide.number, text.trim()));
                }
            }
        }
        records
    }
}
