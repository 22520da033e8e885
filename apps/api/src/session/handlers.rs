//! Axum route handlers for session lifecycle, resume upload and downloads.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::normalize::{normalize, TextStats};
use crate::extraction::{extract_document, DocumentKind, MethodAttempt};
use crate::interview::answers::{answer_progress, AnswerProgress};
use crate::session::{ResumeDocument, Session};
use crate::state::AppState;

/// Multipart field carrying the resume.
const FILE_FIELD: &str = "file";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub session: Session,
    pub progress: AnswerProgress,
}

#[derive(Debug, Serialize)]
pub struct FileDetails {
    pub file_name: String,
    pub size_bytes: usize,
    pub size_kb: String,
    pub content_type: String,
    pub kind: DocumentKind,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_details: FileDetails,
    pub extraction_method: &'static str,
    pub attempts: Vec<MethodAttempt>,
    pub text: String,
    pub stats: TextStats,
}

/// The three plain-text artifacts a session can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Extracted,
    Questions,
    Feedback,
}

impl Artifact {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "extracted" => Some(Artifact::Extracted),
            "questions" => Some(Artifact::Questions),
            "feedback" => Some(Artifact::Feedback),
            _ => None,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Artifact::Extracted => "extracted",
            Artifact::Questions => "questions",
            Artifact::Feedback => "feedback",
        }
    }

    /// Artifact body, if the session has produced it yet.
    fn render(self, session: &Session) -> Option<String> {
        match self {
            Artifact::Extracted => session.document.as_ref().map(|d| d.text.clone()),
            Artifact::Questions => session.questions.as_ref().map(|q| q.to_text()),
            Artifact::Feedback => session.feedback.clone(),
        }
    }
}

/// `resume.pdf` + `questions` → `resume.pdf_questions.txt`, restricted to
/// characters that are safe inside a quoted header value.
pub fn download_file_name(original: &str, artifact: Artifact) -> String {
    let stem: String = original
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() || c == ' ') && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = if stem.trim().is_empty() { "resume".to_string() } else { stem };
    format!("{stem}_{}.txt", artifact.suffix())
}

/// Body-limit failures become 413; anything else is a malformed request.
fn multipart_error(err: MultipartError, limit: usize, context: &str) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!(
            "File too large. The maximum upload size is {:.1} MB.",
            limit as f64 / (1024.0 * 1024.0)
        ))
    } else {
        AppError::Validation(format!("{context}: {err}"))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionCreatedResponse>) {
    let session = state.sessions.create().await;
    (
        StatusCode::CREATED,
        Json(SessionCreatedResponse {
            session_id: session.id,
        }),
    )
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.sessions.get(session_id).await?;
    let progress = answer_progress(&session);
    Ok(Json(SessionResponse { session, progress }))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_end_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/resume
///
/// Multipart upload of a PDF or DOCX resume. The declared content type picks
/// the extraction chain; anything else is rejected before parsing.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    // Fail fast on unknown sessions before reading the body.
    state.sessions.get(session_id).await?;

    let limit = state.config.max_upload_bytes;
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit, "Invalid multipart body"))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("resume").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, limit, "Failed to read upload"))?;
        upload = Some((file_name, content_type, bytes));
        break;
    }

    let (file_name, content_type, bytes) = upload.ok_or_else(|| {
        AppError::Validation(format!("Missing '{FILE_FIELD}' field in upload"))
    })?;
    if bytes.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    info!(
        "Session {session_id}: processing '{}' ({}, {} bytes)",
        file_name,
        content_type,
        bytes.len()
    );

    let kind = DocumentKind::from_declared(&content_type)?;
    let size_bytes = bytes.len();
    let extracted = extract_document(kind, bytes).await?;

    let text = normalize(&extracted.text);
    let stats = TextStats::compute(&text);

    let document = ResumeDocument {
        file_name: file_name.clone(),
        content_type: content_type.clone(),
        kind,
        size_bytes,
        extraction_method: extracted.method,
        text: text.clone(),
        stats: stats.clone(),
    };
    state
        .sessions
        .update(session_id, |s| {
            s.set_document(document);
            Ok(())
        })
        .await?;

    Ok(Json(UploadResponse {
        file_details: FileDetails {
            file_name,
            size_bytes,
            size_kb: format!("{:.0} KB", size_bytes as f64 / 1024.0),
            content_type,
            kind,
        },
        extraction_method: extracted.method,
        attempts: extracted.attempts,
        text,
        stats,
    }))
}

/// GET /api/v1/sessions/:id/downloads/:artifact
///
/// Serves `extracted`, `questions` or `feedback` as a plain-text attachment.
pub async fn handle_download(
    State(state): State<AppState>,
    Path((session_id, artifact)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, AppError> {
    let artifact = Artifact::parse(&artifact).ok_or_else(|| {
        AppError::NotFound(format!(
            "Unknown artifact '{artifact}'; expected extracted, questions or feedback"
        ))
    })?;

    let session = state.sessions.get(session_id).await?;
    let body = artifact.render(&session).ok_or_else(|| {
        AppError::NotFound(format!(
            "No {} available for this session yet",
            artifact.suffix()
        ))
    })?;

    let original = session
        .document
        .as_ref()
        .map(|d| d.file_name.as_str())
        .unwrap_or("resume");
    let disposition = format!(
        "attachment; filename=\"{}\"",
        download_file_name(original, artifact)
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
