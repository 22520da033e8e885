//! Answer collection against the session's current questions.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::session::Session;

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerUpdate {
    pub section: String,
    /// Zero-based position of the question within its section.
    pub index: usize,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerProgress {
    pub answered: usize,
    pub total: usize,
    /// Every question has a non-blank answer; feedback may be requested.
    pub complete: bool,
}

pub fn answer_progress(session: &Session) -> AnswerProgress {
    let (answered, total) = session
        .answers
        .iter()
        .flat_map(|s| s.answers.iter())
        .fold((0, 0), |(answered, total), a| {
            (answered + usize::from(!a.trim().is_empty()), total + 1)
        });

    AnswerProgress {
        answered,
        total,
        complete: total > 0 && answered == total,
    }
}

/// Applies a batch of answer updates. The whole batch is validated first:
/// one bad section name or index rejects it and nothing is written.
pub fn apply_answer_updates(
    session: &mut Session,
    updates: &[AnswerUpdate],
) -> Result<AnswerProgress, AppError> {
    if session.questions.is_none() {
        return Err(AppError::Validation(
            "No questions have been generated for this session yet".to_string(),
        ));
    }

    let mut targets = Vec::with_capacity(updates.len());
    for update in updates {
        let section = session
            .answers
            .iter()
            .position(|s| s.section == update.section)
            .ok_or_else(|| {
                AppError::Validation(format!("Unknown section '{}'", update.section))
            })?;
        let len = session.answers[section].answers.len();
        if update.index >= len {
            return Err(AppError::Validation(format!(
                "Question index {} is out of range for '{}' ({} questions)",
                update.index, update.section, len
            )));
        }
        targets.push(section);
    }

    let mut changed = false;
    for (update, section) in updates.iter().zip(targets) {
        let slot = &mut session.answers[section].answers[update.index];
        if *slot != update.answer {
            *slot = update.answer.clone();
            changed = true;
        }
    }

    // Feedback describes the old answers.
    if changed {
        session.feedback = None;
    }

    Ok(answer_progress(session))
}
