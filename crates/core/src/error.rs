//! Error types for assessment extraction.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while extracting assessments from a slide deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read the input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The file is not a `.pptx` presentation.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The uploaded payload could not be decoded.
    #[error("Invalid upload payload: {0}")]
    PayloadError(String),

    /// ZIP archive error (a PPTX is a ZIP container).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error inside the PPTX.
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// Failed to build or save the Excel workbook.
    #[error("Excel write error: {0}")]
    WorkbookError(String),
}
