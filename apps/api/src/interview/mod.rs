// Interview pipeline: question generation, answer collection, feedback.
// All model calls go through llm_client; nothing here talks to Gemini directly.

pub mod answers;
pub mod feedback;
pub mod handlers;
pub mod parser;
pub mod prompts;
pub mod questions;
