//! Resume text extraction.
//!
//! Each supported document kind owns an ordered list of extraction methods.
//! Methods are tried in order; the first one that yields non-blank text wins.
//! A method never panics or errors out of the chain: it reports `Text`,
//! `Empty` or `Failed`, and the chain records every attempt.

pub mod docx;
pub mod normalize;
pub mod pdf;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("No text could be extracted ({} method(s) tried)", .attempts.len())]
    NoText { attempts: Vec<MethodAttempt> },

    #[error("Extraction task failed: {0}")]
    Task(String),
}

/// The document formats accepted for upload, keyed on the declared MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        // Browsers may append parameters, e.g. "application/pdf; charset=binary".
        let essence = mime.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case(PDF_MIME) {
            Some(DocumentKind::Pdf)
        } else if essence.eq_ignore_ascii_case(DOCX_MIME) {
            Some(DocumentKind::Docx)
        } else {
            None
        }
    }

    /// Like `from_mime`, but an unknown type is an `UnsupportedFormat` error.
    pub fn from_declared(mime: &str) -> Result<Self, ExtractionError> {
        Self::from_mime(mime).ok_or_else(|| ExtractionError::UnsupportedFormat(mime.to_string()))
    }

    /// The extraction methods for this kind, in the order they are tried.
    pub fn methods(self) -> Vec<Box<dyn ExtractionMethod>> {
        match self {
            DocumentKind::Pdf => pdf::pdf_methods(),
            DocumentKind::Docx => vec![Box::new(docx::DocxXmlExtractor)],
        }
    }
}

/// Result of a single extraction method over a document.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Text(String),
    Empty,
    Failed(String),
}

impl ExtractionOutcome {
    /// Classifies raw extractor output: whitespace-only text counts as `Empty`.
    pub fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            ExtractionOutcome::Empty
        } else {
            ExtractionOutcome::Text(text)
        }
    }
}

/// One routine that tries to recover plain text from document bytes.
pub trait ExtractionMethod: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, bytes: &[u8]) -> ExtractionOutcome;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Text,
    Empty,
    Failed,
}

/// Record of one method's attempt, kept for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct MethodAttempt {
    pub method: &'static str,
    pub status: AttemptStatus,
    pub detail: Option<String>,
}

/// Successful chain result: the text and which method produced it.
#[derive(Debug, Clone)]
pub struct ChainResult {
    pub text: String,
    pub method: &'static str,
    pub attempts: Vec<MethodAttempt>,
}

/// Runs `methods` in order and returns the first non-blank text.
pub fn run_chain(
    methods: &[Box<dyn ExtractionMethod>],
    bytes: &[u8],
) -> Result<ChainResult, ExtractionError> {
    let mut attempts = Vec::with_capacity(methods.len());

    for method in methods {
        match method.extract(bytes) {
            ExtractionOutcome::Text(text) => {
                info!(
                    "Extraction method '{}' produced {} chars",
                    method.name(),
                    text.len()
                );
                attempts.push(MethodAttempt {
                    method: method.name(),
                    status: AttemptStatus::Text,
                    detail: None,
                });
                return Ok(ChainResult {
                    text,
                    method: method.name(),
                    attempts,
                });
            }
            ExtractionOutcome::Empty => {
                debug!("Extraction method '{}' produced no text", method.name());
                attempts.push(MethodAttempt {
                    method: method.name(),
                    status: AttemptStatus::Empty,
                    detail: None,
                });
            }
            ExtractionOutcome::Failed(reason) => {
                warn!("Extraction method '{}' failed: {}", method.name(), reason);
                attempts.push(MethodAttempt {
                    method: method.name(),
                    status: AttemptStatus::Failed,
                    detail: Some(reason),
                });
            }
        }
    }

    Err(ExtractionError::NoText { attempts })
}

/// Runs the extraction chain for `kind`.
/// Parsing is CPU-bound, so the chain runs on the blocking pool.
pub async fn extract_document(
    kind: DocumentKind,
    bytes: bytes::Bytes,
) -> Result<ChainResult, ExtractionError> {
    tokio::task::spawn_blocking(move || run_chain(&kind.methods(), &bytes))
        .await
        .map_err(|e| ExtractionError::Task(e.to_string()))?
}
