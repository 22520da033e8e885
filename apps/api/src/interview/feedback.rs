//! Answer Feedback — one model call over every question/answer pair.

use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::interview::prompts::FEEDBACK_PROMPT_HEADER;
use crate::llm_client::GenerativeModel;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionQa {
    pub section: String,
    pub pairs: Vec<QaPair>,
}

/// Zips each section's questions with its answers, in section order.
pub fn collect_qa(session: &Session) -> Vec<SectionQa> {
    let Some(questions) = &session.questions else {
        return Vec::new();
    };

    questions
        .sections
        .iter()
        .map(|section| {
            let answers = session
                .answers_for(&section.name)
                .map(|a| a.answers.as_slice())
                .unwrap_or_default();
            SectionQa {
                section: section.name.clone(),
                pairs: section
                    .questions
                    .iter()
                    .enumerate()
                    .map(|(i, question)| QaPair {
                        question: question.clone(),
                        answer: answers.get(i).cloned().unwrap_or_default(),
                    })
                    .collect(),
            }
        })
        .collect()
}

pub fn build_feedback_prompt(sections: &[SectionQa]) -> String {
    let mut prompt = FEEDBACK_PROMPT_HEADER.to_string();
    for section in sections {
        prompt.push_str(&format!("\n{}:\n", section.section));
        for (i, pair) in section.pairs.iter().enumerate() {
            prompt.push_str(&format!(
                "\nQ{}: {}\nAnswer: {}\n",
                i + 1,
                pair.question,
                pair.answer
            ));
        }
    }
    prompt
}

/// Returns the model's raw feedback text; no parsing is attempted.
pub async fn generate_feedback(
    model: &dyn GenerativeModel,
    sections: &[SectionQa],
) -> Result<String, AppError> {
    let pair_count: usize = sections.iter().map(|s| s.pairs.len()).sum();
    if pair_count == 0 {
        return Err(AppError::Validation(
            "There are no answered questions to give feedback on".to_string(),
        ));
    }

    info!(
        "Requesting feedback on {pair_count} answer(s) from {}",
        model.model_name()
    );

    model
        .generate(&build_feedback_prompt(sections))
        .await
        .map_err(|e| AppError::Llm(format!("Feedback generation failed: {e}")))
}
