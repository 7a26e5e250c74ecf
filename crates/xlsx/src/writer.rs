//! Spreadsheet output for assessment records.

use std::path::{Path, PathBuf};

use assess_core::{AssessmentRecord, Error, Result};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

/// Header label for the slide number column.
pub const HEADER_SLIDE: &str = "Slide";

/// Header label for the matched text column.
pub const HEADER_TEXT: &str = "Assessment Text";

/// Writes assessment records to an `.xlsx` workbook at a fixed path.
///
/// The target file is replaced wholesale on every write; there is no
/// append or merge.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    path: PathBuf,
}

impl ReportWriter {
    /// Create a writer bound to the given output path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this writer saves to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the records to a workbook and save it.
    ///
    /// Layout: a bold header row (`Slide` | `Assessment Text`), then one
    /// row per record with the slide number as a number cell and the text
    /// as a string cell.
    pub fn write(&self, records: &[AssessmentRecord]) -> Result<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        let header_format = Format::new().set_bold();
        worksheet
            .write_string_with_format(0, 0, HEADER_SLIDE, &header_format)
            .map_err(workbook_error)?;
        worksheet
            .write_string_with_format(0, 1, HEADER_TEXT, &header_format)
            .map_err(workbook_error)?;

        for (i, record) in records.iter().enumerate() {
            let row = (i + 1) as u32;
            worksheet
                .write_number(row, 0, record.slide as f64)
                .map_err(workbook_error)?;
            worksheet
                .write_string(row, 1, record.text.as_str())
                .map_err(workbook_error)?;
        }

        workbook.save(&self.path).map_err(workbook_error)?;
        log::debug!(
            "wrote {} record(s) to {}",
            records.len(),
            self.path.display()
        );

        Ok(())
    }
}

fn workbook_error(e: XlsxError) -> Error {
    Error::WorkbookError(e.to_string())
}
