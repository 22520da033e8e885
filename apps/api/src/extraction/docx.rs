//! DOCX text extraction: read the WordprocessingML parts straight out of the
//! ZIP container and keep the text runs.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::{ExtractionMethod, ExtractionOutcome};

const BODY_PART: &str = "word/document.xml";

/// Upper bound on inflated XML across all parts read from one document.
/// The upload limit only bounds the compressed size.
pub const MAX_XML_BYTES: u64 = 8 * 1024 * 1024;

pub struct DocxXmlExtractor;

impl ExtractionMethod for DocxXmlExtractor {
    fn name(&self) -> &'static str {
        "docx_xml"
    }

    fn extract(&self, bytes: &[u8]) -> ExtractionOutcome {
        match extract_docx_text(bytes) {
            Ok(text) => ExtractionOutcome::from_text(text),
            Err(reason) => ExtractionOutcome::Failed(reason),
        }
    }
}

/// Headers, then the body, then footers.
fn extract_docx_text(bytes: &[u8]) -> Result<String, String> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| format!("not a DOCX container: {e}"))?;

    let mut headers = Vec::new();
    let mut footers = Vec::new();
    for name in archive.file_names() {
        if is_part(name, "word/header") {
            headers.push(name.to_string());
        } else if is_part(name, "word/footer") {
            footers.push(name.to_string());
        }
    }
    headers.sort();
    footers.sort();

    let mut text = String::new();
    let mut budget = MAX_XML_BYTES;
    for part in &headers {
        text.push_str(&part_text(&mut archive, part, &mut budget)?);
    }
    text.push_str(&part_text(&mut archive, BODY_PART, &mut budget)?);
    for part in &footers {
        text.push_str(&part_text(&mut archive, part, &mut budget)?);
    }

    Ok(text)
}

fn is_part(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(".xml"))
        .is_some_and(|n| n.chars().all(|c| c.is_ascii_digit()))
}

/// Inflates `part` and converts it to text, charging its size to `budget`.
fn part_text(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    part: &str,
    budget: &mut u64,
) -> Result<String, String> {
    let exceeded = || format!("{part} exceeds the {MAX_XML_BYTES}-byte limit for uncompressed XML");

    let file = archive
        .by_name(part)
        .map_err(|e| format!("missing {part}: {e}"))?;
    // The declared size can lie, so the read itself is bounded too.
    if file.size() > *budget {
        return Err(exceeded());
    }

    let mut raw = Vec::new();
    file.take(*budget + 1)
        .read_to_end(&mut raw)
        .map_err(|e| format!("unreadable {part}: {e}"))?;
    let read = raw.len() as u64;
    if read > *budget {
        return Err(exceeded());
    }
    *budget -= read;

    let xml = String::from_utf8(raw).map_err(|e| format!("unreadable {part}: {e}"))?;
    xml_to_text(&xml).map_err(|e| format!("malformed {part}: {e}"))
}

/// Collects `w:t` runs; paragraphs end lines, tabs and breaks are kept.
fn xml_to_text(xml: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut out = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => out.push('\t'),
                b"w:br" | b"w:cr" => out.push('\n'),
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text_run => out.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn document_xml(paragraphs: &[&str]) -> String {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{p}</w:t></w:r></w:p>"))
            .collect();
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{body}</w:body></w:document>"
        )
    }

    /// Builds a minimal DOCX archive from `(part name, xml)` pairs.
    pub(crate) fn build_docx(parts: &[(&str, String)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, xml) in parts {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    /// A DOCX whose body holds `paragraphs`.
    pub(crate) fn sample_docx(paragraphs: &[&str]) -> Vec<u8> {
        build_docx(&[(BODY_PART, document_xml(paragraphs))])
    }

    #[test]
    fn test_extracts_paragraphs_as_lines() {
        let docx = sample_docx(&["Jane Doe", "Rust &amp; Go developer"]);
        match DocxXmlExtractor.extract(&docx) {
            ExtractionOutcome::Text(text) => assert_eq!(text, "Jane Doe\nRust & Go developer\n"),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_headers_precede_body_and_footers_follow() {
        let docx = build_docx(&[
            (BODY_PART, document_xml(&["Body"])),
            ("word/header1.xml", document_xml(&["Header"])),
            ("word/footer1.xml", document_xml(&["Footer"])),
            ("word/headerstyles.xml", document_xml(&["Ignored"])),
        ]);
        let text = extract_docx_text(&docx).unwrap();
        assert_eq!(text, "Header\nBody\nFooter\n");
    }

    #[test]
    fn test_tabs_and_breaks_are_kept() {
        let xml = "<w:document><w:body><w:p><w:r><w:t>A</w:t><w:tab/><w:t>B</w:t><w:br/><w:t>C</w:t></w:r></w:p></w:body></w:document>";
        assert_eq!(xml_to_text(xml).unwrap(), "A\tB\nC\n");
    }

    #[test]
    fn test_text_outside_runs_is_ignored() {
        let xml = "<w:document><w:body><w:p><w:instrText>PAGE</w:instrText><w:r><w:t>Kept</w:t></w:r></w:p></w:body></w:document>";
        assert_eq!(xml_to_text(xml).unwrap(), "Kept\n");
    }

    #[test]
    fn test_empty_body_is_empty() {
        let docx = sample_docx(&[]);
        assert_eq!(DocxXmlExtractor.extract(&docx), ExtractionOutcome::Empty);
    }

    #[test]
    fn test_missing_body_part_fails() {
        let docx = build_docx(&[("word/styles.xml", "<w:styles/>".to_string())]);
        assert!(matches!(
            DocxXmlExtractor.extract(&docx),
            ExtractionOutcome::Failed(reason) if reason.contains("word/document.xml")
        ));
    }

    #[test]
    fn test_oversized_body_part_fails() {
        let filler = "x".repeat(MAX_XML_BYTES as usize);
        let docx = build_docx(&[(BODY_PART, document_xml(&[&filler]))]);
        // Compressed, the archive is far below the upload limit.
        assert!(docx.len() < 1024 * 1024);

        match DocxXmlExtractor.extract(&docx) {
            ExtractionOutcome::Failed(reason) => {
                assert!(reason.contains("exceeds"), "{reason}");
                assert!(reason.contains(BODY_PART), "{reason}");
            }
            other => panic!("expected failure, got {} chars", text_len(&other)),
        }
    }

    #[test]
    fn test_limit_applies_across_parts() {
        let half = "x".repeat(MAX_XML_BYTES as usize / 2);
        let docx = build_docx(&[
            (BODY_PART, document_xml(&["Body"])),
            ("word/header1.xml", document_xml(&[&half])),
            ("word/header2.xml", document_xml(&[&half])),
        ]);
        let err = extract_docx_text(&docx).unwrap_err();
        assert!(err.contains("word/header2.xml exceeds"), "{err}");
    }

    fn text_len(outcome: &ExtractionOutcome) -> usize {
        match outcome {
            ExtractionOutcome::Text(text) => text.len(),
            _ => 0,
        }
    }

    #[test]
    fn test_non_zip_bytes_fail() {
        assert!(matches!(
            DocxXmlExtractor.extract(b"%PDF-1.4 not a zip"),
            ExtractionOutcome::Failed(_)
        ));
    }
}
