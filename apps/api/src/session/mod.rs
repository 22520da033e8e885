// Interview sessions: one record per user session, held in memory only.
// Created on first interaction, dropped on explicit end or after the idle TTL.

pub mod handlers;
pub mod store;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::extraction::normalize::TextStats;
use crate::extraction::DocumentKind;
use crate::interview::parser::ParsedQuestions;

/// The uploaded resume after extraction and normalization.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeDocument {
    pub file_name: String,
    pub content_type: String,
    pub kind: DocumentKind,
    pub size_bytes: usize,
    pub extraction_method: &'static str,
    pub text: String,
    pub stats: TextStats,
}

/// Answers for one section, parallel-indexed to that section's questions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionAnswers {
    pub section: String,
    pub answers: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub document: Option<ResumeDocument>,
    /// Bumped on every upload so in-flight generations can detect a swapped resume.
    pub document_revision: u32,
    pub questions: Option<ParsedQuestions>,
    pub answers: Vec<SectionAnswers>,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Session {
            id,
            document: None,
            document_revision: 0,
            questions: None,
            answers: Vec::new(),
            feedback: None,
            created_at: now,
            last_seen_at: now,
        }
    }

    /// Stores a new resume. Questions, answers and feedback belonged to the
    /// previous resume and are discarded.
    pub fn set_document(&mut self, document: ResumeDocument) {
        self.document = Some(document);
        self.document_revision += 1;
        self.questions = None;
        self.answers.clear();
        self.feedback = None;
    }

    /// Stores questions and resets answers to one empty string per question.
    pub fn set_questions(&mut self, questions: ParsedQuestions) {
        self.answers = questions
            .sections
            .iter()
            .map(|section| SectionAnswers {
                section: section.name.clone(),
                answers: vec![String::new(); section.questions.len()],
            })
            .collect();
        self.questions = Some(questions);
        self.feedback = None;
    }

    pub fn answers_for(&self, section: &str) -> Option<&SectionAnswers> {
        self.answers.iter().find(|a| a.section == section)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::interview::parser::parse_questions;

    pub(crate) fn sample_document(text: &str) -> ResumeDocument {
        ResumeDocument {
            file_name: "resume.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            kind: DocumentKind::Pdf,
            size_bytes: 2048,
            extraction_method: "pdf_extract",
            text: text.to_string(),
            stats: TextStats::compute(text),
        }
    }

    #[test]
    fn test_set_questions_sizes_answers_per_section() {
        let mut session = Session::new(Uuid::new_v4());
        session.set_questions(parse_questions(
            "Technical Questions:\n1. A?\n2. B?\nBehavioral Questions:\n1. C?",
        ));

        let questions = session.questions.as_ref().unwrap();
        for section in &questions.sections {
            let answers = session.answers_for(&section.name).unwrap();
            assert_eq!(answers.answers.len(), section.questions.len());
            assert!(answers.answers.iter().all(String::is_empty));
        }
    }

    #[test]
    fn test_new_document_resets_interview_state() {
        let mut session = Session::new(Uuid::new_v4());
        session.set_document(sample_document("first"));
        session.set_questions(parse_questions("Technical Questions:\n1. A?"));
        session.feedback = Some("Good".to_string());

        session.set_document(sample_document("second"));

        assert_eq!(session.document_revision, 2);
        assert!(session.questions.is_none());
        assert!(session.answers.is_empty());
        assert!(session.feedback.is_none());
        assert_eq!(session.document.as_ref().unwrap().text, "second");
    }
}
