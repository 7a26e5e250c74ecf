//! PPTX file parser implementation.

use assess_core::{Error, ExtractedSlide, Result, SlideDeck};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use zip::ZipArchive;

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";

/// Parser for PPTX (Office Open XML) files.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a PPTX file from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R, filename: &str) -> Result<SlideDeck> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut deck = SlideDeck::new(filename);

        let slide_paths = self.slide_paths_in_order(&mut archive)?;
        log::debug!("{}: {} slide(s)", filename, slide_paths.len());

        for (idx, slide_path) in slide_paths.iter().enumerate() {
            let slide = self.parse_slide(&mut archive, slide_path, idx + 1)?;
            deck.add_slide(slide);
        }

        Ok(deck)
    }

    /// Parse a PPTX file held in an in-memory byte buffer.
    pub fn parse_bytes(&self, bytes: &[u8], filename: &str) -> Result<SlideDeck> {
        self.parse(Cursor::new(bytes), filename)
    }

    /// Determine slide part paths in presentation order.
    ///
    /// The order of `sldId` entries in `ppt/presentation.xml` is
    /// authoritative; each entry's `r:id` resolves to a part path through
    /// the presentation relationships. Decks without a `sldIdLst` fall back
    /// to relationship targets sorted by the slide number embedded in the
    /// part name.
    fn slide_paths_in_order<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
    ) -> Result<Vec<String>> {
        let rels_content = self.read_file_from_archive(archive, PRESENTATION_RELS_PART)?;
        let targets = slide_targets_by_rel_id(&rels_content)?;

        let presentation_content = self.read_file_from_archive(archive, PRESENTATION_PART)?;
        let rel_ids = slide_rel_ids(&presentation_content)?;

        if rel_ids.is_empty() {
            log::debug!("presentation.xml has no sldIdLst; ordering slides by part number");
            let mut slides: Vec<(String, Option<usize>)> = targets
                .into_iter()
                .map(|(id, path)| {
                    let order = extract_slide_number(&path).or_else(|| extract_slide_number(&id));
                    (path, order)
                })
                .collect();
            slides.sort_by(|a, b| match (a.1, b.1) {
                (Some(na), Some(nb)) => na.cmp(&nb),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.0.cmp(&b.0),
            });
            return Ok(slides.into_iter().map(|(path, _)| path).collect());
        }

        let mut paths = Vec::with_capacity(rel_ids.len());
        for rel_id in rel_ids {
            let path = targets.get(&rel_id).ok_or_else(|| {
                Error::XmlError(format!("Slide relationship '{}' not found", rel_id))
            })?;
            paths.push(path.clone());
        }

        Ok(paths)
    }

    /// Parse a single slide part into its shape texts.
    fn parse_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
        slide_number: usize,
    ) -> Result<ExtractedSlide> {
        let content = self.read_file_from_archive(archive, slide_path)?;
        let mut slide = ExtractedSlide::new(slide_number);

        for text in self.extract_shape_texts(&content)? {
            slide.add_text(text);
        }

        Ok(slide)
    }

    /// Extract the text of each drawable shape from slide XML.
    ///
    /// Run text is accumulated verbatim so text split across runs keeps its
    /// internal whitespace. Paragraph boundaries become newlines. Shapes
    /// whose accumulated text is blank are skipped.
    fn extract_shape_texts(&self, xml_content: &str) -> Result<Vec<String>> {
        let mut texts = Vec::new();
        let mut reader = Reader::from_str(xml_content);

        let mut current_text: Option<String> = None;
        let mut in_text_body = false;
        let mut in_text_run = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                    b"sp" | b"pic" => {
                        current_text = Some(String::new());
                    }
                    b"txBody" => {
                        in_text_body = true;
                    }
                    b"p" if in_text_body => {
                        if let Some(ref mut text) = current_text {
                            if !text.is_empty() {
                                text.push('\n');
                            }
                        }
                    }
                    b"t" if in_text_body => {
                        in_text_run = true;
                    }
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => {
                    if in_text_body && local_name(e.name().as_ref()) == b"p" {
                        if let Some(ref mut text) = current_text {
                            if !text.is_empty() {
                                text.push('\n');
                            }
                        }
                    }
                }
                Ok(Event::Text(ref e)) => {
                    if in_text_run {
                        let fragment = e.unescape().map_err(|err| {
                            Error::XmlError(format!("Error unescaping run text: {}", err))
                        })?;
                        if let Some(ref mut text) = current_text {
                            text.push_str(&fragment);
                        }
                    }
                }
                Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                    b"sp" | b"pic" => {
                        if let Some(text) = current_text.take() {
                            if !text.trim().is_empty() {
                                texts.push(text);
                            }
                        }
                        in_text_body = false;
                        in_text_run = false;
                    }
                    b"txBody" => {
                        in_text_body = false;
                    }
                    b"t" => {
                        in_text_run = false;
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!("Error parsing slide: {}", e)));
                }
                _ => {}
            }
        }

        Ok(texts)
    }

    /// Read a file from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Collect slide relationship targets keyed by relationship id.
fn slide_targets_by_rel_id(xml: &str) -> Result<HashMap<String, String>> {
    let mut targets = HashMap::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let mut rel_type = String::new();
                let mut target = String::new();
                let mut id = String::new();

                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Type" => {
                            rel_type = String::from_utf8_lossy(&attr.value).to_string();
                        }
                        b"Target" => {
                            target = String::from_utf8_lossy(&attr.value).to_string();
                        }
                        b"Id" => {
                            id = String::from_utf8_lossy(&attr.value).to_string();
                        }
                        _ => {}
                    }
                }

                if rel_type.contains("/slide")
                    && !rel_type.contains("slideLayout")
                    && !rel_type.contains("slideMaster")
                {
                    targets.insert(id, normalize_target_path(&target));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(targets)
}

/// Resolve a relationship target to a path inside the archive.
fn normalize_target_path(target: &str) -> String {
    if let Some(stripped) = target.strip_prefix('/') {
        stripped.to_string()
    } else {
        format!("ppt/{}", target)
    }
}

/// Collect `r:id` references of `sldId` entries in document order.
fn slide_rel_ids(xml: &str) -> Result<Vec<String>> {
    let mut rel_ids = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut in_slide_list = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == b"sldIdLst" => {
                in_slide_list = true;
            }
            Ok(Event::End(ref e)) if local_name(e.name().as_ref()) == b"sldIdLst" => {
                in_slide_list = false;
            }
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if in_slide_list && local_name(e.name().as_ref()) == b"sldId" =>
            {
                for attr in e.attributes().flatten() {
                    // r:id carries the relationship reference; the plain id
                    // attribute is the slide's internal id.
                    if local_name(attr.key.as_ref()) == b"id" {
                        let value = String::from_utf8_lossy(&attr.value).to_string();
                        if value.starts_with("rId") {
                            rel_ids.push(value);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(rel_ids)
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn build_pptx(files: &[(&str, &str)]) -> Vec<u8> {
        let cursor = Cursor::new(Vec::new());
        let mut writer = ZipWriter::new(cursor);
        let options = FileOptions::default();
        for (path, content) in files {
            writer.start_file(*path, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn slide_xml(shapes: &[&str]) -> String {
        let mut body = String::new();
        for text in shapes {
            body.push_str(&format!(
                "<p:sp><p:txBody><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>",
                text
            ));
        }
        wrap_slide(&body)
    }

    fn wrap_slide(shapes: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <p:sld xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
             xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\">\
             <p:cSld><p:spTree>{}</p:spTree></p:cSld></p:sld>",
            shapes
        )
    }

    fn presentation_xml(rel_ids: &[&str]) -> String {
        let mut entries = String::new();
        for (i, rel_id) in rel_ids.iter().enumerate() {
            entries.push_str(&format!(
                "<p:sldId id=\"{}\" r:id=\"{}\"/>",
                256 + i,
                rel_id
            ));
        }
        format!(
            "<?xml version=\"1.0\"?>\
             <p:presentation \
             xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\" \
             xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">\
             <p:sldIdLst>{}</p:sldIdLst></p:presentation>",
            entries
        )
    }

    fn rels_xml(entries: &[(&str, &str)]) -> String {
        let mut body = String::new();
        for (id, target) in entries {
            body.push_str(&format!(
                "<Relationship Id=\"{}\" \
                 Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide\" \
                 Target=\"{}\"/>",
                id, target
            ));
        }
        format!(
            "<?xml version=\"1.0\"?>\
             <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
             {}</Relationships>",
            body
        )
    }

    #[test]
    fn parses_shape_text_in_document_order() {
        let bytes = build_pptx(&[
            ("ppt/presentation.xml", &presentation_xml(&["rId1"])),
            (
                "ppt/_rels/presentation.xml.rels",
                &rels_xml(&[("rId1", "slides/slide1.xml")]),
            ),
            (
                "ppt/slides/slide1.xml",
                &slide_xml(&["Quarterly Review", "Assessment A"]),
            ),
        ]);

        let deck = PptxParser::new().parse_bytes(&bytes, "deck.pptx").unwrap();
        assert_eq!(deck.filename, "deck.pptx");
        assert_eq!(deck.slides.len(), 1);
        assert_eq!(deck.slides[0].number, 1);
        assert_eq!(deck.slides[0].texts, vec!["Quarterly Review", "Assessment A"]);
    }

    #[test]
    fn slide_order_follows_sld_id_lst_not_part_names() {
        let bytes = build_pptx(&[
            ("ppt/presentation.xml", &presentation_xml(&["rId2", "rId1"])),
            (
                "ppt/_rels/presentation.xml.rels",
                &rels_xml(&[
                    ("rId1", "slides/slide1.xml"),
                    ("rId2", "slides/slide2.xml"),
                ]),
            ),
            ("ppt/slides/slide1.xml", &slide_xml(&["Alpha"])),
            ("ppt/slides/slide2.xml", &slide_xml(&["Beta"])),
        ]);

        let deck = PptxParser::new().parse_bytes(&bytes, "deck.pptx").unwrap();
        assert_eq!(deck.slides.len(), 2);
        assert_eq!(deck.slides[0].number, 1);
        assert_eq!(deck.slides[0].texts, vec!["Beta"]);
        assert_eq!(deck.slides[1].number, 2);
        assert_eq!(deck.slides[1].texts, vec!["Alpha"]);
    }

    #[test]
    fn falls_back_to_part_numbering_without_sld_id_lst() {
        let presentation = "<?xml version=\"1.0\"?>\
             <p:presentation \
             xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\"/>";
        let bytes = build_pptx(&[
            ("ppt/presentation.xml", presentation),
            (
                "ppt/_rels/presentation.xml.rels",
                &rels_xml(&[
                    ("rId2", "slides/slide2.xml"),
                    ("rId1", "slides/slide1.xml"),
                ]),
            ),
            ("ppt/slides/slide1.xml", &slide_xml(&["Alpha"])),
            ("ppt/slides/slide2.xml", &slide_xml(&["Beta"])),
        ]);

        let deck = PptxParser::new().parse_bytes(&bytes, "deck.pptx").unwrap();
        assert_eq!(deck.slides[0].texts, vec!["Alpha"]);
        assert_eq!(deck.slides[1].texts, vec!["Beta"]);
    }

    #[test]
    fn multi_run_text_concatenates_verbatim() {
        let slide = wrap_slide(
            "<p:sp><p:txBody><a:p>\
             <a:r><a:t>Assessment </a:t></a:r>\
             <a:r><a:t>A</a:t></a:r>\
             </a:p></p:txBody></p:sp>",
        );
        let bytes = build_pptx(&[
            ("ppt/presentation.xml", &presentation_xml(&["rId1"])),
            (
                "ppt/_rels/presentation.xml.rels",
                &rels_xml(&[("rId1", "slides/slide1.xml")]),
            ),
            ("ppt/slides/slide1.xml", &slide),
        ]);

        let deck = PptxParser::new().parse_bytes(&bytes, "deck.pptx").unwrap();
        assert_eq!(deck.slides[0].texts, vec!["Assessment A"]);
    }

    #[test]
    fn paragraphs_join_with_newlines() {
        let slide = wrap_slide(
            "<p:sp><p:txBody>\
             <a:p><a:r><a:t>Assessment: scope</a:t></a:r></a:p>\
             <a:p><a:r><a:t>Second line</a:t></a:r></a:p>\
             </p:txBody></p:sp>",
        );
        let bytes = build_pptx(&[
            ("ppt/presentation.xml", &presentation_xml(&["rId1"])),
            (
                "ppt/_rels/presentation.xml.rels",
                &rels_xml(&[("rId1", "slides/slide1.xml")]),
            ),
            ("ppt/slides/slide1.xml", &slide),
        ]);

        let deck = PptxParser::new().parse_bytes(&bytes, "deck.pptx").unwrap();
        assert_eq!(deck.slides[0].texts, vec!["Assessment: scope\nSecond line"]);
    }

    #[test]
    fn blank_shapes_are_skipped() {
        let slide = wrap_slide(
            "<p:sp><p:txBody><a:p><a:r><a:t>   </a:t></a:r></a:p></p:txBody></p:sp>\
             <p:sp><p:txBody><a:p><a:r><a:t>Assessment B</a:t></a:r></a:p></p:txBody></p:sp>\
             <p:sp><p:txBody><a:p/></p:txBody></p:sp>",
        );
        let bytes = build_pptx(&[
            ("ppt/presentation.xml", &presentation_xml(&["rId1"])),
            (
                "ppt/_rels/presentation.xml.rels",
                &rels_xml(&[("rId1", "slides/slide1.xml")]),
            ),
            ("ppt/slides/slide1.xml", &slide),
        ]);

        let deck = PptxParser::new().parse_bytes(&bytes, "deck.pptx").unwrap();
        assert_eq!(deck.slides[0].texts, vec!["Assessment B"]);
    }

    #[test]
    fn non_zip_payload_is_a_zip_error() {
        let err = PptxParser::new()
            .parse_bytes(b"this is not a zip archive", "broken.pptx")
            .unwrap_err();
        assert!(matches!(err, Error::ZipError(_)));
    }

    #[test]
    fn archive_without_presentation_parts_is_a_zip_error() {
        let bytes = build_pptx(&[("ppt/slides/slide1.xml", &slide_xml(&["Alpha"]))]);
        let err = PptxParser::new()
            .parse_bytes(&bytes, "deck.pptx")
            .unwrap_err();
        assert!(matches!(err, Error::ZipError(_)));
    }

    #[test]
    fn malformed_slide_xml_is_an_xml_error() {
        let bytes = build_pptx(&[
            ("ppt/presentation.xml", &presentation_xml(&["rId1"])),
            (
                "ppt/_rels/presentation.xml.rels",
                &rels_xml(&[("rId1", "slides/slide1.xml")]),
            ),
            ("ppt/slides/slide1.xml", "<p:sld><p:txBody><a:p"),
        ]);

        let err = PptxParser::new()
            .parse_bytes(&bytes, "deck.pptx")
            .unwrap_err();
        assert!(matches!(err, Error::XmlError(_)));
    }

    #[test]
    fn missing_slide_relationship_is_an_xml_error() {
        let bytes = build_pptx(&[
            ("ppt/presentation.xml", &presentation_xml(&["rId9"])),
            (
                "ppt/_rels/presentation.xml.rels",
                &rels_xml(&[("rId1", "slides/slide1.xml")]),
            ),
            ("ppt/slides/slide1.xml", &slide_xml(&["Alpha"])),
        ]);

        let err = PptxParser::new()
            .parse_bytes(&bytes, "deck.pptx")
            .unwrap_err();
        match err {
            Error::XmlError(msg) => assert!(msg.contains("rId9")),
            other => panic!("expected XmlError, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slide1.xml"), Some(1));
        assert_eq!(extract_slide_number("slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }
}
