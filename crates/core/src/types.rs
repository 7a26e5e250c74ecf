//! Domain types for extracted slide content and assessment records.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// File extension for PowerPoint Open XML presentations.
pub const PPTX_EXTENSION: &str = "pptx";

/// Check whether a path carries the `.pptx` extension (case-insensitive).
///
/// The check runs before any bytes are opened or parsed, so a file named
/// `notes.txt` is rejected without touching its contents.
pub fn has_pptx_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(PPTX_EXTENSION))
        .unwrap_or(false)
}

/// A parsed slide deck with the text content of each slide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideDeck {
    /// Original filename (without path).
    pub filename: String,

    /// Slides in presentation order.
    pub slides: Vec<ExtractedSlide>,
}

impl SlideDeck {
    /// Create a new, empty deck for the given filename.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            slides: Vec::new(),
        }
    }

    /// Add a slide to the deck.
    pub fn add_slide(&mut self, slide: ExtractedSlide) {
        self.slides.push(slide);
    }

    /// Total number of text shapes across all slides.
    pub fn shape_count(&self) -> usize {
        self.slides.iter().map(|s| s.texts.len()).sum()
    }
}

/// A single slide and the text of its shapes, in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedSlide {
    /// 1-based slide number.
    pub number: usize,

    /// Text of each shape on the slide. Paragraphs within a shape are
    /// joined with newlines.
    pub texts: Vec<String>,
}

impl ExtractedSlide {
    /// Create a new slide with the given number.
    pub fn new(number: usize) -> Self {
        Self {
            number,
            texts: Vec::new(),
        }
    }

    /// Add the text of one shape to this slide.
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.texts.push(text.into());
    }
}

/// One matched assessment: the slide it came from and its trimmed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    /// 1-based number of the slide the text was found on.
    pub slide: usize,

    /// The matched shape text with surrounding whitespace removed.
    pub text: String,
}

impl AssessmentRecord {
    /// Create a new record.
    pub fn new(slide: usize, text: impl Into<String>) -> Self {
        Self {
            slide,
            text: text.into(),
        }
    }
}
