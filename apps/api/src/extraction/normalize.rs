//! Whitespace normalization and simple statistics over extracted text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// A newline, any whitespace, then another newline: one or more blank lines.
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapses blank-line runs to `\n\n`, then every whitespace run (those
/// included) to a single space, and trims both ends. The result is one line.
pub fn normalize(text: &str) -> String {
    let text = BLANK_LINES.replace_all(text, "\n\n");
    WHITESPACE_RUN.replace_all(&text, " ").trim().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStats {
    pub total_characters: usize,
    pub total_words: usize,
    /// Characters per word, rounded to two decimals. Zero for empty text.
    pub average_word_length: f64,
}

impl TextStats {
    pub fn compute(text: &str) -> Self {
        let total_characters = text.chars().count();
        let total_words = text.split_whitespace().count();
        let average_word_length = if total_words == 0 {
            0.0
        } else {
            (total_characters as f64 / total_words as f64 * 100.0).round() / 100.0
        };

        TextStats {
            total_characters,
            total_words,
            average_word_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "   ",
        "Jane Doe",
        "  Jane   Doe \n\n\n\n  Rust\tEngineer  ",
        "Line one\nLine two\n \n\t\nLine three",
        "a\r\n\r\nb\r\nc",
        "\n\n\nleading blank lines",
        "x  \u{a0} y\n \n \n z",
    ];

    #[test]
    fn test_collapses_blank_lines_and_spaces() {
        assert_eq!(
            normalize("  Jane   Doe \n\n\n\n  Rust\tEngineer  "),
            "Jane Doe Rust Engineer"
        );
        assert_eq!(normalize("Jane Doe\n\n\nRust"), "Jane Doe Rust");
    }

    #[test]
    fn test_single_newlines_become_spaces() {
        assert_eq!(normalize("Line one\nLine two"), "Line one Line two");
    }

    #[test]
    fn test_whitespace_only_becomes_empty() {
        assert_eq!(normalize(" \n\t \n "), "");
    }

    #[test]
    fn test_crlf_paragraphs() {
        assert_eq!(normalize("a\r\n\r\nb\r\nc"), "a b c");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for sample in SAMPLES {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_output_is_a_single_line() {
        for sample in SAMPLES {
            let out = normalize(sample);
            assert!(!out.contains('\n'), "{out:?}");
            assert!(!out.contains('\r'), "{out:?}");
        }
    }

    #[test]
    fn test_never_two_consecutive_spaces() {
        for sample in SAMPLES {
            let out = normalize(sample);
            assert!(!out.contains("  "), "{out:?}");
            assert_eq!(out, out.trim());
        }
    }

    #[test]
    fn test_stats_for_simple_text() {
        let stats = TextStats::compute("Rust is fast");
        assert_eq!(stats.total_characters, 12);
        assert_eq!(stats.total_words, 3);
        assert!((stats.average_word_length - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stats_round_to_two_decimals() {
        // 8 chars / 3 words = 2.666…
        let stats = TextStats::compute("ab cd ef");
        assert!((stats.average_word_length - 2.67).abs() < 1e-9);
    }

    #[test]
    fn test_stats_for_empty_text() {
        let stats = TextStats::compute("");
        assert_eq!(stats.total_words, 0);
        assert_eq!(stats.average_word_length, 0.0);
    }
}
