//! Excel report output for assessment extraction.

pub mod writer;

pub use writer::{ReportWriter, HEADER_SLIDE, HEADER_TEXT};
