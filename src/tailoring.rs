//! Resume tailoring for one matched job.

use crate::llm::prompts::{RESUME_WRITER_SYSTEM, tailoring_prompt};
use crate::llm::{CompletionClient, CompletionRequest, LlmError, complete_json};
use crate::store::{JobSeekerProfile, MatchRecord};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// One role in the tailored experience section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    /// Job title held.
    pub role: String,
    /// Employer.
    pub organization: String,
    /// Free-form date range.
    pub period: String,
    /// Achievement bullets.
    pub bullets: Vec<String>,
}

/// Resume rewritten for a target job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TailoredResume {
    /// One-line headline.
    pub headline: String,
    /// Professional summary aimed at the job.
    pub summary: String,
    /// Most relevant skills first.
    pub highlighted_skills: Vec<String>,
    /// Experience section.
    pub experience: Vec<ExperienceEntry>,
    /// Education lines.
    pub education: Vec<String>,
    /// Certifications.
    pub certifications: Vec<String>,
    /// Job keywords woven into the text.
    pub keywords: Vec<String>,
}

/// Ask the model for a resume tailored to `job`.
///
/// `profile.details` should already be populated; see [`StructuredProfile::needs_extraction`].
///
/// [`StructuredProfile::needs_extraction`]: crate::resume::StructuredProfile::needs_extraction
pub async fn generate(
    client: &dyn CompletionClient,
    profile: &JobSeekerProfile,
    job: &MatchRecord,
) -> Result<TailoredResume, LlmError> {
    let prompt = tailoring_prompt(
        &profile.analysis.primary_role,
        &profile.details,
        &profile.resume_text,
        job,
    );
    let request = CompletionRequest::new(RESUME_WRITER_SYSTEM, prompt)
        .temperature(0.4)
        .max_tokens(2500);
    let resume: TailoredResume = complete_json(client, request).await?;
    if resume.summary.trim().is_empty() && resume.experience.is_empty() {
        return Err(LlmError::EmptyContent);
    }
    tracing::info!(
        job_seeker_id = %profile.job_seeker_id,
        job_id = %job.job_id,
        skills = resume.highlighted_skills.len(),
        roles = resume.experience.len(),
        "Tailored resume generated"
    );
    Ok(resume)
}

fn section(out: &mut String, title: &str, items: &[String]) {
    let items: Vec<&str> = items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .collect();
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{}", title.to_uppercase());
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
}

/// Plain-text rendering suitable for download or copy-paste.
pub fn render_text(resume: &TailoredResume) -> String {
    let mut out = String::new();
    if !resume.headline.trim().is_empty() {
        let _ = writeln!(out, "{}", resume.headline.trim());
    }
    if !resume.summary.trim().is_empty() {
        let _ = writeln!(out, "\nSUMMARY\n{}", resume.summary.trim());
    }
    if !resume.highlighted_skills.is_empty() {
        let _ = writeln!(out, "\nSKILLS\n{}", resume.highlighted_skills.join(" | "));
    }
    if !resume.experience.is_empty() {
        let _ = writeln!(out, "\nEXPERIENCE");
        for entry in &resume.experience {
            let mut heading = entry.role.trim().to_string();
            if !entry.organization.trim().is_empty() {
                let _ = write!(heading, ", {}", entry.organization.trim());
            }
            if !entry.period.trim().is_empty() {
                let _ = write!(heading, " ({})", entry.period.trim());
            }
            let _ = writeln!(out, "{heading}");
            for bullet in &entry.bullets {
                let _ = writeln!(out, "  - {}", bullet.trim());
            }
        }
    }
    section(&mut out, "Education", &resume.education);
    section(&mut out, "Certifications", &resume.certifications);
    out.trim_end().to_string()
}
