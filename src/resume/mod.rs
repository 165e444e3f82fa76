//! Resume ingestion: text extraction, skill cleanup, and LLM analysis.

pub mod analysis;
pub mod extract;
pub mod skills;

use serde::Serialize;
use sha2::{Digest, Sha256};

pub use analysis::{ResumeAnalysis, StructuredProfile, analyze_resume, extract_profile};
pub use extract::{ExtractError, ResumeFormat, extract_text};
pub use skills::{canonical_skill, filter_skills};

/// Minimum trimmed length for extracted text to be worth analysing.
pub const MIN_RESUME_CHARS: usize = 50;

/// Text and basic statistics of an uploaded resume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedResume {
    /// Extracted text, trimmed.
    pub raw_text: String,
    /// Character count of `raw_text`.
    pub text_length: usize,
    /// Whitespace-separated word count.
    pub word_count: usize,
    /// Original upload name.
    pub filename: String,
    /// SHA-256 of the normalised text, used to recognise re-uploads.
    pub fingerprint: String,
}

/// Extract and validate the text of an uploaded resume file.
pub fn parse_resume(bytes: &[u8], filename: &str) -> Result<ParsedResume, ExtractError> {
    let text = extract_text(bytes, filename)?;
    parse_resume_text(&text, filename)
}

/// Validate already-extracted resume text.
pub fn parse_resume_text(text: &str, filename: &str) -> Result<ParsedResume, ExtractError> {
    let raw_text = text.trim().to_string();
    let text_length = raw_text.chars().count();
    if text_length < MIN_RESUME_CHARS {
        return Err(ExtractError::InsufficientText {
            length: text_length,
        });
    }

    let word_count = raw_text.split_whitespace().count();
    tracing::debug!(filename, text_length, word_count, "Resume text extracted");
    Ok(ParsedResume {
        fingerprint: fingerprint(&raw_text),
        raw_text,
        text_length,
        word_count,
        filename: filename.to_string(),
    })
}

fn fingerprint(text: &str) -> String {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut hasher = Sha256::new();
    hasher.update(normalized.to_lowercase().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::extract::docx_fixture;

    #[test]
    fn parses_docx_resume_with_counts() {
        let bytes = docx_fixture(&[
            "Jane Doe, Data Analyst",
            "Five years of SQL, Python and Tableau reporting for retail banks.",
        ]);
        let parsed = parse_resume(&bytes, "jane.docx").expect("parsed resume");
        assert_eq!(parsed.filename, "jane.docx");
        assert_eq!(parsed.word_count, 15);
        assert_eq!(parsed.text_length, parsed.raw_text.chars().count());
        assert_eq!(parsed.fingerprint.len(), 64);
    }

    #[test]
    fn short_text_is_rejected() {
        let err = parse_resume_text("   too short   ", "cv.txt").expect_err("short text");
        assert!(matches!(err, ExtractError::InsufficientText { length: 9 }));
    }

    #[test]
    fn fingerprint_ignores_whitespace_and_case() {
        let body = "Experienced engineer building distributed systems in Rust and Go.";
        let a = parse_resume_text(body, "a.txt").unwrap();
        let b = parse_resume_text(&body.to_uppercase().replace(' ', "  \n"), "b.txt").unwrap();
        assert_eq!(a.fingerprint, b.fingerprint);
    }
}
