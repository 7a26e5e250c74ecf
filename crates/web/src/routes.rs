//! HTTP routes: the upload page and the extraction API.

use std::path::Path;

use assess_core::{has_pptx_extension, AssessmentExtractor, AssessmentRecord, Error, Result};
use assess_pptx::PptxParser;
use assess_xlsx::ReportWriter;
use base64::engine::general_purpose;
use base64::Engine as _;
use rocket::response::content::RawHtml;
use rocket::serde::json::Json;
use rocket::{get, post, State};
use serde::{Deserialize, Serialize};

use crate::server::ServerConfig;

/// The single-page upload UI, embedded at compile time.
const INDEX_HTML: &str = include_str!("index.html");

/// Upload request: the chosen filename and its data-URL contents.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractRequest {
    pub filename: String,
    /// File contents as produced by `FileReader.readAsDataURL`: a
    /// `data:<media type>;base64,` prefix followed by the base64 payload.
    pub contents: String,
}

/// Outcome class of an extraction request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractStatus {
    Ok,
    Empty,
    Error,
}

/// Response payload for the extraction API.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub status: ExtractStatus,
    pub message: String,
    pub records: Vec<AssessmentRecord>,
}

impl ExtractResponse {
    fn ok(message: String, records: Vec<AssessmentRecord>) -> Self {
        Self {
            status: ExtractStatus::Ok,
            message,
            records,
        }
    }

    fn empty(message: impl Into<String>) -> Self {
        Self {
            status: ExtractStatus::Empty,
            message: message.into(),
            records: Vec::new(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: ExtractStatus::Error,
            message: message.into(),
            records: Vec::new(),
        }
    }
}

#[get("/")]
pub fn index() -> RawHtml<&'static str> {
    RawHtml(INDEX_HTML)
}

#[post("/api/extract", data = "<request>")]
pub fn extract(
    config: &State<ServerConfig>,
    request: Json<ExtractRequest>,
) -> Json<ExtractResponse> {
    Json(process_upload(
        config.inner(),
        &request.filename,
        &request.contents,
    ))
}

/// Run one upload through the gate, decode, parse, match, write pipeline,
/// folding every failure into an error response. Never panics on bad
/// input.
pub fn process_upload(config: &ServerConfig, filename: &str, contents: &str) -> ExtractResponse {
    if !has_pptx_extension(Path::new(filename)) {
        return ExtractResponse::error("Please upload a .pptx file.");
    }

    match run_extraction(config, filename, contents) {
        Ok(response) => response,
        Err(e) => {
            log::warn!("extraction failed for '{}': {}", filename, e);
            ExtractResponse::error(format!("Error: {}", e))
        }
    }
}

fn run_extraction(
    config: &ServerConfig,
    filename: &str,
    contents: &str,
) -> Result<ExtractResponse> {
    let bytes = decode_data_url(contents)?;
    let deck = PptxParser::new().parse_bytes(&bytes, filename)?;
    log::debug!(
        "'{}': {} slide(s), {} text shape(s)",
        filename,
        deck.slides.len(),
        deck.shape_count()
    );

    let records = AssessmentExtractor::with_prefix(config.prefix.as_str()).extract(&deck);
    if records.is_empty() {
        return Ok(ExtractResponse::empty(
            "No assessments found in this presentation.",
        ));
    }

    ReportWriter::new(&config.output_path).write(&records)?;

    let message = format!(
        "Successfully extracted {} assessment(s). Excel file overwritten: {}",
        records.len(),
        config.output_path.display()
    );
    Ok(ExtractResponse::ok(message, records))
}

/// Decode a `FileReader.readAsDataURL` payload to raw bytes.
///
/// Everything up to and including the first comma is the media-type
/// prefix; a payload without one is treated as bare base64.
fn decode_data_url(contents: &str) -> Result<Vec<u8>> {
    let encoded = contents
        .split_once(',')
        .map(|(_, data)| data)
        .unwrap_or(contents);

    general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| Error::PayloadError(e.to_string()))
}
