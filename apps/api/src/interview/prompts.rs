// Interview LLM prompt templates.
// All prompts for the interview module are defined here.

/// Number of questions requested per section.
pub const QUESTIONS_PER_SECTION: usize = 5;

pub const QUESTION_PROMPT_TEMPLATE: &str = r#"Generate a list of interview questions based on the following resume information, focusing on the candidate's experience, skills, achievements, and education. The questions should assess the candidate's qualifications, problem-solving abilities, and relevant experiences.

INSTRUCTIONS:
1. Create exactly 5 technical questions based on the candidate's skills and experience
2. Create exactly 5 behavioral questions relevant to their background
3. Format the output with clear headers for each section
4. Number each question
5. Keep questions specific to their experience

RESUME:
{resume_text}

Format the output exactly as:

Technical Questions:
1. [Question]
2. [Question]
...

Behavioral Questions:
1. [Question]
2. [Question]
..."#;

pub const FEEDBACK_PROMPT_HEADER: &str = r#"Analyze the following interview answers and provide constructive feedback.

For each answer, consider:
1. Completeness of the response
2. Relevance to the question
3. Specific examples or details provided
4. Areas for improvement

Questions and Answers:
"#;

pub fn build_question_prompt(resume_text: &str) -> String {
    QUESTION_PROMPT_TEMPLATE.replace("{resume_text}", resume_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_prompt_embeds_resume() {
        let prompt = build_question_prompt("Jane Doe — Rust, Kafka, 6 years");
        assert!(prompt.contains("RESUME:\nJane Doe — Rust, Kafka, 6 years\n"));
        assert!(!prompt.contains("{resume_text}"));
    }

    #[test]
    fn test_question_prompt_asks_for_both_headers() {
        let prompt = build_question_prompt("x");
        assert!(prompt.contains("Technical Questions:\n1. [Question]"));
        assert!(prompt.contains("Behavioral Questions:\n1. [Question]"));
        assert!(prompt.contains(&format!("exactly {QUESTIONS_PER_SECTION} technical")));
    }
}
