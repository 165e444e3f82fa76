//! LLM passes over resume text: role detection and structured profile extraction.

use crate::llm::{CompletionClient, CompletionRequest, complete_json, prompts};
use crate::resume::skills::filter_skills;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Role, seniority, and search hints inferred from a resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    /// Most likely job title for the candidate.
    #[serde(default)]
    pub primary_role: String,
    /// Short, job-board friendly search terms.
    #[serde(default)]
    pub simple_search_terms: Vec<String>,
    /// Model confidence in the role detection, 0..=1.
    #[serde(default)]
    pub confidence: f64,
    /// Seniority label such as "Junior" or "Senior".
    #[serde(default)]
    pub seniority_level: String,
    /// Competencies listed or implied by the resume.
    #[serde(default)]
    pub skills: Vec<String>,
    /// Distinguishing strengths.
    #[serde(default)]
    pub core_strengths: Vec<String>,
    /// Keywords for job search.
    #[serde(default)]
    pub job_search_keywords: Vec<String>,
    /// Best single query for the job board.
    #[serde(default)]
    pub optimal_search_query: String,
    /// Preferred job location.
    #[serde(default)]
    pub location_preference: String,
    /// Industries the candidate fits.
    #[serde(default)]
    pub industries: Vec<String>,
    /// Adjacent roles worth searching.
    #[serde(default)]
    pub alternative_roles: Vec<String>,
}

impl ResumeAnalysis {
    /// Neutral analysis used whenever the model call fails.
    pub fn fallback() -> Self {
        Self {
            primary_role: "Professional".into(),
            simple_search_terms: vec!["Professional".into()],
            confidence: 0.5,
            seniority_level: "Mid-Level".into(),
            skills: vec!["General Skills".into()],
            core_strengths: vec!["Adaptable".into(), "Professional".into()],
            job_search_keywords: vec!["Professional".into()],
            optimal_search_query: "Professional".into(),
            location_preference: "United States".into(),
            industries: vec!["General".into()],
            alternative_roles: vec!["Specialist".into(), "Consultant".into()],
        }
    }

    fn normalized(mut self) -> Self {
        self.primary_role = self.primary_role.trim().to_string();
        if self.primary_role.is_empty() {
            self.primary_role = "Professional".into();
        }
        self.skills = filter_skills(&self.skills);
        self.simple_search_terms = filter_skills(&self.simple_search_terms);
        if self.simple_search_terms.is_empty() {
            self.simple_search_terms = vec![self.primary_role.clone()];
        }
        if self.optimal_search_query.trim().is_empty() {
            self.optimal_search_query = self.primary_role.clone();
        }
        self.confidence = if self.confidence.is_finite() {
            self.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }
}

/// Free-text candidate details used by recruiters, interviews, and tailoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredProfile {
    /// Highest education level.
    #[serde(default, deserialize_with = "text_or_list")]
    pub education_level: String,
    /// Field of study.
    #[serde(default, deserialize_with = "text_or_list")]
    pub major: String,
    /// Graduated, expected graduation, etc.
    #[serde(default, deserialize_with = "text_or_list")]
    pub graduation_status: String,
    /// Universities attended.
    #[serde(default, deserialize_with = "text_or_list")]
    pub university_background: String,
    /// Spoken languages.
    #[serde(default, deserialize_with = "text_or_list")]
    pub languages: String,
    /// Certifications held.
    #[serde(default, deserialize_with = "text_or_list")]
    pub certificates: String,
    /// Technical skills.
    #[serde(default, deserialize_with = "text_or_list")]
    pub hard_skills: String,
    /// Interpersonal skills.
    #[serde(default, deserialize_with = "text_or_list")]
    pub soft_skills: String,
    /// Experience bucket such as "3-5 years".
    #[serde(default, deserialize_with = "text_or_list")]
    pub work_experience: String,
    /// Notable projects.
    #[serde(default, deserialize_with = "text_or_list")]
    pub project_experience: String,
    /// Preferred work location.
    #[serde(default, deserialize_with = "text_or_list")]
    pub location_preference: String,
    /// Preferred industries.
    #[serde(default, deserialize_with = "text_or_list")]
    pub industry_preference: String,
    /// Expected salary.
    #[serde(default, deserialize_with = "text_or_list")]
    pub salary_expectation: String,
    /// Expected benefits.
    #[serde(default, deserialize_with = "text_or_list")]
    pub benefits_expectation: String,
}

impl StructuredProfile {
    /// True when the second extraction pass has not populated any education or experience data.
    pub fn needs_extraction(&self) -> bool {
        self.education_level.is_empty()
            && self.work_experience.is_empty()
            && self.project_experience.is_empty()
    }

    /// Seed a profile from a role analysis when the detailed pass is skipped.
    pub fn from_analysis(analysis: &ResumeAnalysis) -> Self {
        Self {
            hard_skills: analysis.skills.join(", "),
            soft_skills: analysis.core_strengths.join(", "),
            location_preference: analysis.location_preference.clone(),
            industry_preference: analysis.industries.join(", "),
            ..Self::default()
        }
    }

    /// Fill blank fields from `other`.
    pub fn merge_missing(&mut self, other: StructuredProfile) {
        let pairs = [
            (&mut self.education_level, other.education_level),
            (&mut self.major, other.major),
            (&mut self.graduation_status, other.graduation_status),
            (&mut self.university_background, other.university_background),
            (&mut self.languages, other.languages),
            (&mut self.certificates, other.certificates),
            (&mut self.hard_skills, other.hard_skills),
            (&mut self.soft_skills, other.soft_skills),
            (&mut self.work_experience, other.work_experience),
            (&mut self.project_experience, other.project_experience),
            (&mut self.location_preference, other.location_preference),
            (&mut self.industry_preference, other.industry_preference),
            (&mut self.salary_expectation, other.salary_expectation),
            (&mut self.benefits_expectation, other.benefits_expectation),
        ];
        for (target, value) in pairs {
            if target.trim().is_empty() {
                *target = value;
            }
        }
    }
}

/// Accept strings, lists, numbers, or nulls from the model and flatten them to text.
fn text_or_list<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(flatten_value(&Value::deserialize(deserializer)?))
}

fn flatten_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .map(flatten_value)
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("{key}: {}", flatten_value(value)))
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

/// Detect the candidate's role and search hints; never fails, falling back on errors.
pub async fn analyze_resume(client: &dyn CompletionClient, resume_text: &str) -> ResumeAnalysis {
    let request = CompletionRequest::new(
        prompts::RESUME_ANALYST_SYSTEM,
        prompts::resume_analysis_prompt(resume_text),
    )
    .temperature(0.7)
    .max_tokens(2000);

    match complete_json::<ResumeAnalysis>(client, request).await {
        Ok(analysis) => {
            let analysis = analysis.normalized();
            tracing::info!(
                role = %analysis.primary_role,
                confidence = analysis.confidence,
                skills = analysis.skills.len(),
                "Resume analysed"
            );
            analysis
        }
        Err(error) => {
            tracing::warn!(error = %error, "Resume analysis failed; using fallback analysis");
            ResumeAnalysis::fallback()
        }
    }
}

/// Extract the structured profile; returns an empty profile when the model call fails.
pub async fn extract_profile(
    client: &dyn CompletionClient,
    resume_text: &str,
) -> StructuredProfile {
    let request = CompletionRequest::new(
        prompts::PROFILE_EXTRACTOR_SYSTEM,
        prompts::profile_extraction_prompt(resume_text),
    )
    .temperature(0.0)
    .max_tokens(1500);

    match complete_json::<StructuredProfile>(client, request).await {
        Ok(profile) => profile,
        Err(error) => {
            tracing::warn!(error = %error, "Structured profile extraction failed");
            StructuredProfile::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedClient;
    use serde_json::json;

    #[tokio::test]
    async fn analysis_is_normalized() {
        let client = ScriptedClient::new([json!({
            "primary_role": " Data Analyst ",
            "confidence": 1.7,
            "skills": ["SQL", "Full-time", "sql", "Tableau"],
            "simple_search_terms": [],
            "seniority_level": "Junior"
        })
        .to_string()]);

        let analysis = analyze_resume(&client, "resume text").await;
        assert_eq!(analysis.primary_role, "Data Analyst");
        assert_eq!(analysis.skills, vec!["SQL", "Tableau"]);
        assert_eq!(analysis.simple_search_terms, vec!["Data Analyst"]);
        assert_eq!(analysis.optimal_search_query, "Data Analyst");
        assert_eq!(analysis.confidence, 1.0);

        let request = &client.recorded()[0];
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.max_tokens, 2000);
    }

    #[tokio::test]
    async fn analysis_failure_yields_fallback() {
        let client = ScriptedClient::failing();
        let analysis = analyze_resume(&client, "resume text").await;
        assert_eq!(analysis, ResumeAnalysis::fallback());
    }

    #[tokio::test]
    async fn profile_fields_accept_lists() {
        let client = ScriptedClient::new([json!({
            "education_level": "Bachelor",
            "languages": ["English", "Cantonese"],
            "hard_skills": ["Rust", "SQL"],
            "salary_expectation": 50000,
            "major": null
        })
        .to_string()]);

        let profile = extract_profile(&client, "resume text").await;
        assert_eq!(profile.languages, "English, Cantonese");
        assert_eq!(profile.hard_skills, "Rust, SQL");
        assert_eq!(profile.salary_expectation, "50000");
        assert_eq!(profile.major, "");
        assert!(!profile.needs_extraction());
        assert_eq!(client.recorded()[0].temperature, 0.0);
    }

    #[test]
    fn merge_missing_keeps_existing_values() {
        let mut profile = StructuredProfile {
            hard_skills: "Rust".into(),
            ..StructuredProfile::default()
        };
        profile.merge_missing(StructuredProfile {
            hard_skills: "Go".into(),
            education_level: "Master".into(),
            ..StructuredProfile::default()
        });
        assert_eq!(profile.hard_skills, "Rust");
        assert_eq!(profile.education_level, "Master");
    }
}
