//! Axum route handlers for the Interview API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::answers::{answer_progress, apply_answer_updates, AnswerProgress, AnswerUpdate};
use crate::interview::feedback::{collect_qa, generate_feedback};
use crate::interview::parser::ParsedQuestions;
use crate::interview::questions::generate_questions;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct QuestionsQuery {
    #[serde(default)]
    pub regenerate: bool,
}

#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    pub questions: ParsedQuestions,
    pub progress: AnswerProgress,
    /// False when previously generated questions were returned.
    pub generated: bool,
}

#[derive(Debug, Deserialize)]
pub struct AnswersRequest {
    pub answers: Vec<AnswerUpdate>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub feedback: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions/:id/questions
///
/// Generates questions from the uploaded resume. Existing questions are
/// returned as-is unless `?regenerate=true`.
pub async fn handle_generate_questions(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<QuestionsQuery>,
) -> Result<Json<QuestionsResponse>, AppError> {
    let session = state.sessions.get(session_id).await?;

    let document = session.document.as_ref().ok_or_else(|| {
        AppError::Validation("Upload a resume before generating questions".to_string())
    })?;

    if !query.regenerate {
        if let Some(questions) = session.questions.clone() {
            return Ok(Json(QuestionsResponse {
                questions,
                progress: answer_progress(&session),
                generated: false,
            }));
        }
    }

    let questions = generate_questions(state.llm.as_ref(), &document.text).await?;

    let revision = session.document_revision;
    let progress = state
        .sessions
        .update(session_id, |s| {
            if s.document_revision != revision {
                return Err(AppError::Conflict(
                    "The resume was replaced while questions were being generated".to_string(),
                ));
            }
            s.set_questions(questions.clone());
            Ok(answer_progress(s))
        })
        .await?;

    Ok(Json(QuestionsResponse {
        questions,
        progress,
        generated: true,
    }))
}

/// PUT /api/v1/sessions/:id/answers
pub async fn handle_update_answers(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AnswersRequest>,
) -> Result<Json<AnswerProgress>, AppError> {
    let progress = state
        .sessions
        .update(session_id, |s| apply_answer_updates(s, &request.answers))
        .await?;
    Ok(Json(progress))
}

/// POST /api/v1/sessions/:id/feedback
///
/// Only offered once every question has a non-blank answer.
pub async fn handle_generate_feedback(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<FeedbackResponse>, AppError> {
    let session = state.sessions.get(session_id).await?;

    if session.questions.is_none() {
        return Err(AppError::Validation(
            "No questions have been generated for this session yet".to_string(),
        ));
    }
    if !answer_progress(&session).complete {
        return Err(AppError::Validation(
            "Please provide answers to all questions to get feedback.".to_string(),
        ));
    }

    let qa = collect_qa(&session);
    let feedback = generate_feedback(state.llm.as_ref(), &qa).await?;

    state
        .sessions
        .update(session_id, |s| {
            if collect_qa(s) != qa {
                return Err(AppError::Conflict(
                    "Answers changed while feedback was being generated".to_string(),
                ));
            }
            s.feedback = Some(feedback.clone());
            Ok(())
        })
        .await?;

    Ok(Json(FeedbackResponse { feedback }))
}
