//! PDF extraction methods, tried in the order returned by [`pdf_methods`].

use std::panic::{catch_unwind, AssertUnwindSafe};

use lopdf::content::Content;
use lopdf::{Document, Object};

use super::{ExtractionMethod, ExtractionOutcome};

/// TJ kerning offsets below this (in thousandths of an em) are treated as a word gap.
const TJ_SPACE_THRESHOLD: f64 = -200.0;

pub fn pdf_methods() -> Vec<Box<dyn ExtractionMethod>> {
    vec![
        Box::new(LopdfPageText),
        Box::new(PdfExtractText),
        Box::new(ContentStreamScan),
    ]
}

/// Page-by-page text via lopdf's font-aware extractor.
pub struct LopdfPageText;

impl ExtractionMethod for LopdfPageText {
    fn name(&self) -> &'static str {
        "lopdf_page_text"
    }

    fn extract(&self, bytes: &[u8]) -> ExtractionOutcome {
        guarded(|| {
            let doc = load(bytes)?;
            let mut text = String::new();
            let mut last_error = None;

            for page_number in doc.get_pages().keys() {
                match doc.extract_text(&[*page_number]) {
                    Ok(page_text) => {
                        text.push_str(&page_text);
                        text.push('\n');
                    }
                    Err(e) => last_error = Some(format!("page {page_number}: {e}")),
                }
            }

            match last_error {
                Some(err) if text.trim().is_empty() => Err(err),
                _ => Ok(text),
            }
        })
    }
}

/// Whole-document text via pdf-extract.
pub struct PdfExtractText;

impl ExtractionMethod for PdfExtractText {
    fn name(&self) -> &'static str {
        "pdf_extract"
    }

    fn extract(&self, bytes: &[u8]) -> ExtractionOutcome {
        guarded(|| pdf_extract::extract_text_from_mem(bytes).map_err(|e| e.to_string()))
    }
}

/// Last resort: walk every page's content stream and collect the string
/// operands of the text-showing operators, ignoring font encodings.
pub struct ContentStreamScan;

impl ExtractionMethod for ContentStreamScan {
    fn name(&self) -> &'static str {
        "content_stream_scan"
    }

    fn extract(&self, bytes: &[u8]) -> ExtractionOutcome {
        guarded(|| {
            let doc = load(bytes)?;
            let mut text = String::new();

            for page_id in doc.get_pages().values() {
                let raw = doc.get_page_content(*page_id).map_err(|e| e.to_string())?;
                let content = Content::decode(&raw).map_err(|e| e.to_string())?;
                scan_operations(&content, &mut text);
                push_line_break(&mut text);
            }

            Ok(text)
        })
    }
}

fn load(bytes: &[u8]) -> Result<Document, String> {
    let doc = Document::load_mem(bytes).map_err(|e| format!("failed to load PDF: {e}"))?;
    if doc.is_encrypted() {
        return Err("PDF is encrypted".to_string());
    }
    Ok(doc)
}

/// Runs an extractor, mapping errors and panics to `Failed`.
/// pdf-extract and lopdf both panic on some malformed inputs.
fn guarded<F>(f: F) -> ExtractionOutcome
where
    F: FnOnce() -> Result<String, String>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(text)) => ExtractionOutcome::from_text(text),
        Ok(Err(reason)) => ExtractionOutcome::Failed(reason),
        Err(panic) => {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "extractor panicked".to_string());
            ExtractionOutcome::Failed(format!("panic: {reason}"))
        }
    }
}

fn scan_operations(content: &Content, out: &mut String) {
    for op in &content.operations {
        match op.operator.as_str() {
            "Tj" => {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    out.push_str(&decode_pdf_string(bytes));
                }
            }
            // ' and " move to the next line before showing their string operand.
            "'" | "\"" => {
                push_line_break(out);
                if let Some(Object::String(bytes, _)) = op.operands.last() {
                    out.push_str(&decode_pdf_string(bytes));
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => out.push_str(&decode_pdf_string(bytes)),
                            Object::Integer(n) if (*n as f64) < TJ_SPACE_THRESHOLD => out.push(' '),
                            Object::Real(r) if f64::from(*r) < TJ_SPACE_THRESHOLD => out.push(' '),
                            _ => {}
                        }
                    }
                }
            }
            "Td" | "TD" | "T*" | "Tm" | "ET" => push_line_break(out),
            _ => {}
        }
    }
}

fn push_line_break(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Decodes a PDF string operand: UTF-16BE when it carries a BOM, Latin-1 otherwise.
fn decode_pdf_string(bytes: &[u8]) -> String {
    let decoded: String = match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
            char::decode_utf16(units)
                .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect()
        }
        _ => bytes.iter().map(|&b| b as char).collect(),
    };

    decoded
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Operation;
    use lopdf::{dictionary, Stream};

    /// Builds a one-page PDF that shows `lines` with Tj operators.
    fn sample_pdf(lines: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
        ];
        for (i, line) in lines.iter().enumerate() {
            operations.push(Operation::new(
                "Td",
                vec![72.into(), (720 - 14 * i as i64).into()],
            ));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_pdf_methods_order() {
        let names: Vec<_> = pdf_methods().iter().map(|m| m.name()).collect();
        assert_eq!(
            names,
            vec!["lopdf_page_text", "pdf_extract", "content_stream_scan"]
        );
    }

    #[test]
    fn test_content_stream_scan_reads_tj_strings() {
        let pdf = sample_pdf(&["Jane Doe", "Senior Rust Engineer"]);
        match ContentStreamScan.extract(&pdf) {
            ExtractionOutcome::Text(text) => {
                assert!(text.contains("Jane Doe"), "got {text:?}");
                assert!(text.contains("Senior Rust Engineer"), "got {text:?}");
                assert!(!text.contains("Jane DoeSenior"), "lines must be separated");
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_content_stream_scan_empty_page_is_empty() {
        let pdf = sample_pdf(&[]);
        assert_eq!(ContentStreamScan.extract(&pdf), ExtractionOutcome::Empty);
    }

    #[test]
    fn test_garbage_bytes_fail_every_method() {
        let garbage = b"definitely not a pdf";
        for method in pdf_methods() {
            assert!(
                matches!(method.extract(garbage), ExtractionOutcome::Failed(_)),
                "{} should fail on garbage",
                method.name()
            );
        }
    }

    #[test]
    fn test_tj_array_inserts_space_for_wide_gaps() {
        let content = Content {
            operations: vec![Operation::new(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("Team"),
                    Object::Integer(-50),
                    Object::string_literal("work"),
                    Object::Integer(-400),
                    Object::string_literal("matters"),
                ])],
            )],
        };
        let mut out = String::new();
        scan_operations(&content, &mut out);
        assert_eq!(out, "Teamwork matters");
    }

    #[test]
    fn test_decode_pdf_string_utf16() {
        let bytes = [0xFE, 0xFF, 0x00, 0x52, 0x00, 0xFC, 0x00, 0x73, 0x00, 0x74];
        assert_eq!(decode_pdf_string(&bytes), "Rüst");
    }

    #[test]
    fn test_decode_pdf_string_latin1_drops_control_chars() {
        assert_eq!(decode_pdf_string(b"Caf\xe9\x07"), "Café");
    }
}
