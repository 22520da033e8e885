//! Question generation: resume text in, parsed question sections out.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::interview::parser::{parse_questions, ParsedQuestions};
use crate::interview::prompts::{build_question_prompt, QUESTIONS_PER_SECTION};
use crate::llm_client::GenerativeModel;

/// Calls the model once and parses its reply.
///
/// A reply from which nothing could be parsed is an error: the session must
/// not advance to answer collection with an empty question list.
pub async fn generate_questions(
    model: &dyn GenerativeModel,
    resume_text: &str,
) -> Result<ParsedQuestions, AppError> {
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "Resume text is empty; nothing to generate questions from".to_string(),
        ));
    }

    info!(
        "Generating interview questions with {} ({} chars of resume)",
        model.model_name(),
        resume_text.len()
    );

    let prompt = build_question_prompt(resume_text);
    let reply = model
        .generate(&prompt)
        .await
        .map_err(|e| AppError::Llm(format!("Question generation failed: {e}")))?;

    let parsed = parse_questions(&reply);

    if parsed.question_count() == 0 {
        let detail = if parsed.recovered_nothing(&reply) {
            format!("{} line(s) could not be parsed", parsed.unparsed_lines.len())
        } else {
            "the reply was empty".to_string()
        };
        warn!("Model reply contained no recognizable questions: {detail}");
        return Err(AppError::UnprocessableEntity(format!(
            "The model reply did not contain any recognizable questions ({detail}). \
             Please try again."
        )));
    }

    if !parsed.unparsed_lines.is_empty() {
        warn!(
            "Ignored {} unparsed line(s) in model reply",
            parsed.unparsed_lines.len()
        );
    }
    for section in &parsed.sections {
        if section.questions.len() != QUESTIONS_PER_SECTION {
            warn!(
                "Section '{}' has {} questions, expected {}",
                section.name,
                section.questions.len(),
                QUESTIONS_PER_SECTION
            );
        }
    }

    Ok(parsed)
}
