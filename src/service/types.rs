//! Request, response, and error types shared by the service and its surfaces.

use crate::config::{Config, SearchMode};
use crate::embedding::EmbeddingClientError;
use crate::interview::InterviewError;
use crate::jobs::{JobBoardError, SalaryBand};
use crate::llm::LlmError;
use crate::matching::ScoredJob;
use crate::qdrant::QdrantError;
use crate::resume::ExtractError;
use crate::store::{JobSeekerProfile, StoreError};
use crate::tailoring::TailoredResume;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by [`crate::service::CareerApi`] operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller supplied an unusable request.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// A referenced record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
    /// The uploaded resume could not be read.
    #[error("Resume could not be processed: {0}")]
    Resume(#[from] ExtractError),
    /// The chat-completion provider failed.
    #[error("LLM request failed: {0}")]
    Llm(#[from] LlmError),
    /// The embedding provider failed.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// The vector store failed.
    #[error("Qdrant request failed: {0}")]
    Qdrant(#[from] QdrantError),
    /// The job board failed.
    #[error("Job board request failed: {0}")]
    JobBoard(#[from] JobBoardError),
    /// The database failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<InterviewError> for ServiceError {
    fn from(error: InterviewError) -> Self {
        match error {
            InterviewError::Llm(inner) => ServiceError::Llm(inner),
            other => ServiceError::InvalidInput(other.to_string()),
        }
    }
}

impl ServiceError {
    /// Whether the failure happened in a vendor API rather than locally.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ServiceError::Llm(_)
                | ServiceError::Embedding(_)
                | ServiceError::Qdrant(_)
                | ServiceError::JobBoard(_)
        )
    }
}

/// Knobs the service reads from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    /// Qdrant collection holding job vectors.
    pub collection: String,
    /// Upper bound on postings embedded per search.
    pub max_jobs_to_index: usize,
    /// Location used when a match request names none.
    pub default_location: String,
    /// Questions per mock interview.
    pub interview_questions: usize,
    /// Run structured extraction while processing resumes.
    pub enable_profile_pass2: bool,
}

impl ServiceSettings {
    /// Settings taken from an explicit configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            collection: config.qdrant_collection_name.clone(),
            max_jobs_to_index: config.max_jobs_to_index,
            default_location: config.default_location.clone(),
            interview_questions: config.interview_questions,
            enable_profile_pass2: config.enable_profile_pass2,
        }
    }
}

/// Result of processing an uploaded resume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeOutcome {
    /// Stored profile.
    pub profile: JobSeekerProfile,
    /// Characters of extracted text.
    pub text_length: usize,
    /// Words of extracted text.
    pub word_count: usize,
    /// True when an identical resume had already been processed.
    pub reused_existing: bool,
}

/// Condensed profile used in listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    /// Profile identifier.
    pub job_seeker_id: String,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// Detected role.
    pub primary_role: String,
    /// Detected seniority.
    pub seniority_level: String,
    /// Matching skills.
    pub skills: Vec<String>,
    /// Preferred location.
    pub location_preference: String,
    /// Uploaded file name.
    pub resume_filename: String,
}

impl From<&JobSeekerProfile> for ProfileSummary {
    fn from(profile: &JobSeekerProfile) -> Self {
        let location = if profile.details.location_preference.trim().is_empty() {
            profile.analysis.location_preference.clone()
        } else {
            profile.details.location_preference.clone()
        };
        Self {
            job_seeker_id: profile.job_seeker_id.clone(),
            created_at: profile.created_at.clone(),
            primary_role: profile.analysis.primary_role.clone(),
            seniority_level: profile.analysis.seniority_level.clone(),
            skills: profile.skills(),
            location_preference: location,
            resume_filename: profile.resume_filename.clone(),
        }
    }
}

/// Parameters of a job search and match run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MatchRequest {
    /// Profile to match.
    pub job_seeker_id: String,
    /// Search keywords; defaults to the detected role.
    #[serde(default)]
    pub keywords: Option<String>,
    /// Search location; defaults to `DEFAULT_JOB_LOCATION`.
    #[serde(default)]
    pub location: Option<String>,
    /// Search depth.
    #[serde(default)]
    pub mode: SearchMode,
    /// Matches to keep; defaults to 20.
    #[serde(default)]
    pub top_k: Option<usize>,
    /// Drop postings whose salary is known and below this amount.
    #[serde(default)]
    pub min_salary: Option<f64>,
}

/// Result of a match run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchOutcome {
    /// Profile matched.
    pub job_seeker_id: String,
    /// Identifier scoping this run's vectors.
    pub search_id: String,
    /// Keywords sent to the job board.
    pub keywords: String,
    /// Location sent to the job board.
    pub location: String,
    /// Search depth used.
    pub mode: SearchMode,
    /// Postings returned by the job board after de-duplication and salary filtering.
    pub jobs_retrieved: usize,
    /// Postings embedded and written to the vector store.
    pub jobs_indexed: usize,
    /// Matches saved to the database.
    pub matches_persisted: usize,
    /// Salary spread across retrieved postings with salary data.
    pub salary_band: Option<SalaryBand>,
    /// Ranked matches, best first.
    pub matches: Vec<ScoredJob>,
}

/// What to interview for: one of the seeker's matches or a recruiter posting.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InterviewTarget {
    /// Candidate.
    pub job_seeker_id: String,
    /// Matched job id.
    #[serde(default)]
    pub job_id: Option<String>,
    /// Recruiter posting id.
    #[serde(default)]
    pub posting_id: Option<i64>,
}

/// A tailored resume with its plain-text rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TailoredResumeOutcome {
    /// Candidate.
    pub job_seeker_id: String,
    /// Target job.
    pub job_id: String,
    /// Target job title.
    pub job_title: String,
    /// Structured resume.
    pub resume: TailoredResume,
    /// Plain-text rendering.
    pub text: String,
}

/// Readiness of the service's dependencies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSnapshot {
    /// Database answered a trivial query.
    pub database_ok: bool,
    /// Qdrant answered the collection listing.
    pub qdrant_reachable: bool,
    /// The job collection exists.
    pub collection_present: bool,
    /// Diagnostics for failed probes.
    pub errors: Vec<String>,
}

impl HealthSnapshot {
    /// Every probe succeeded.
    pub fn is_healthy(&self) -> bool {
        self.database_ok && self.qdrant_reachable
    }
}
