//! Question Parser — turns the model's free-text reply into question sections.
//!
//! Best-effort and line-oriented. Expected shape:
//!
//! ```text
//! Technical Questions:
//! 1. ...
//! 2. ...
//!
//! Behavioral Questions:
//! 1. ...
//! ```
//!
//! Anything that does not fit is kept in `unparsed_lines` instead of being
//! silently dropped, so callers can tell a partial parse from a clean one.

use serde::{Deserialize, Serialize};

/// Suffix that marks a section header line.
const SECTION_SUFFIX: &str = "Questions:";
/// Separator between a question's number and its text.
const NUMBER_SEPARATOR: &str = ". ";

/// A named group of questions, in reply order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSection {
    pub name: String,
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuestions {
    pub sections: Vec<QuestionSection>,
    /// Non-blank lines that were neither a header nor a question under a header.
    pub unparsed_lines: Vec<String>,
}

impl ParsedQuestions {
    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }

    /// True when `reply` had content but not a single question came out of it.
    pub fn recovered_nothing(&self, reply: &str) -> bool {
        self.question_count() == 0 && !reply.trim().is_empty()
    }

    /// Plain-text rendering: `"{section}:\n1. q\n2. q"`, sections separated by a blank line.
    pub fn to_text(&self) -> String {
        self.sections
            .iter()
            .map(|section| {
                let numbered: Vec<String> = section
                    .questions
                    .iter()
                    .enumerate()
                    .map(|(i, q)| format!("{}. {}", i + 1, q))
                    .collect();
                format!("{}:\n{}", section.name, numbered.join("\n"))
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Sections with no questions are dropped; a repeated name replaces the
    /// earlier section's questions but keeps its position.
    fn flush(&mut self, name: Option<String>, questions: Vec<String>) {
        let Some(name) = name else { return };
        if questions.is_empty() {
            return;
        }
        match self.sections.iter_mut().find(|s| s.name == name) {
            Some(existing) => existing.questions = questions,
            None => self.sections.push(QuestionSection { name, questions }),
        }
    }
}

pub fn parse_questions(reply: &str) -> ParsedQuestions {
    let mut parsed = ParsedQuestions::default();
    let mut current_section: Option<String> = None;
    let mut current_questions: Vec<String> = Vec::new();

    for line in reply.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_suffix(':').filter(|_| line.ends_with(SECTION_SUFFIX)) {
            let previous = current_section.replace(header.to_string());
            parsed.flush(previous, std::mem::take(&mut current_questions));
        } else if let Some(question) = numbered_question(line) {
            if current_section.is_some() {
                current_questions.push(question.to_string());
            } else {
                parsed.unparsed_lines.push(line.to_string());
            }
        } else {
            parsed.unparsed_lines.push(line.to_string());
        }
    }

    parsed.flush(current_section, current_questions);
    parsed
}

/// `"3. Tell me about..."` → `"Tell me about..."`.
fn numbered_question(line: &str) -> Option<&str> {
    if !line.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    line.split_once(NUMBER_SEPARATOR).map(|(_, question)| question)
}
