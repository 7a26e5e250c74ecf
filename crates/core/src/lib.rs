//! Core domain types and assessment matching for slide deck extraction.

pub mod error;
pub mod extract;
pub mod types;

pub use error::{Error, Result};
pub use extract::{AssessmentExtractor, DEFAULT_PREFIX};
pub use types::{has_pptx_extension, AssessmentRecord, ExtractedSlide, SlideDeck};
