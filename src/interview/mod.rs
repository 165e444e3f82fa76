//! AI mock interviews.
//!
//! A session asks `total_questions` questions about one job. Every answer is scored by the model;
//! the final answer also produces an overall summary. Sessions are plain data so the service can
//! persist them between requests.

mod session;

use crate::llm::LlmError;
use crate::store::{MatchRecord, RecruiterPosting};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use session::{AnswerOutcome, start_interview, submit_answer};

/// Errors raised while running an interview.
#[derive(Debug, Error)]
pub enum InterviewError {
    /// The submitted answer was blank.
    #[error("Answer must not be empty")]
    EmptyAnswer,
    /// Every question has already been answered.
    #[error("Interview session is already completed")]
    AlreadyCompleted,
    /// The model could not produce a question or evaluation.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

/// Snapshot of the job being interviewed for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterviewJob {
    /// Matched job id or `posting-{id}` for recruiter postings.
    pub job_id: String,
    /// Position title.
    pub title: String,
    /// Hiring company.
    pub company: String,
    /// Industry, may be empty.
    pub industry: String,
    /// Experience requirement, may be empty.
    pub experience_level: String,
    /// Role description.
    pub description: String,
    /// Main responsibilities, may be empty.
    pub responsibilities: String,
    /// Required skills as free text.
    pub required_skills: String,
}

impl InterviewJob {
    /// Interview for a job-board posting the seeker was matched to.
    pub fn from_match(record: &MatchRecord) -> Self {
        let skills: Vec<String> = record
            .matched_skills
            .iter()
            .chain(&record.missing_skills)
            .cloned()
            .collect();
        Self {
            job_id: record.job_id.clone(),
            title: record.job_title.clone(),
            company: record.company_name.clone(),
            industry: String::new(),
            experience_level: String::new(),
            description: record.job_description.clone(),
            responsibilities: String::new(),
            required_skills: skills.join(", "),
        }
    }

    /// Interview for a recruiter posting.
    pub fn from_posting(posting: &RecruiterPosting) -> Self {
        let job = &posting.posting;
        Self {
            job_id: format!("posting-{}", posting.id),
            title: job.job_title.clone(),
            company: job.client_company.clone(),
            industry: job.industry.clone(),
            experience_level: job.experience_level.clone(),
            description: job.job_description.clone(),
            responsibilities: job.main_responsibilities.clone(),
            required_skills: job.required_skills.clone(),
        }
    }
}

/// Model feedback on one answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerEvaluation {
    /// 0..=10.
    pub score: u8,
    /// Specific feedback.
    pub feedback: String,
    /// What the answer did well.
    pub strengths: Vec<String>,
    /// How the answer could improve.
    pub improvements: Vec<String>,
}

/// End-of-interview report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterviewSummary {
    /// 0..=100.
    pub overall_score: u8,
    /// Overall assessment.
    pub summary: String,
    /// Strongest points across the interview.
    pub key_strengths: Vec<String>,
    /// Weakest points across the interview.
    pub improvement_areas: Vec<String>,
    /// `High`, `Medium`, or `Low`.
    pub job_fit: String,
    /// Next steps for the candidate.
    pub recommendations: Vec<String>,
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    /// Questions remain.
    InProgress,
    /// Every question was answered.
    Completed,
}

impl InterviewStatus {
    /// Stable identifier stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStatus::InProgress => "in_progress",
            InterviewStatus::Completed => "completed",
        }
    }
}

/// A mock interview and everything said in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewSession {
    /// Random UUID.
    pub session_id: String,
    /// Candidate being interviewed.
    pub job_seeker_id: String,
    /// Job snapshot taken when the interview started.
    pub job: InterviewJob,
    /// Questions to ask in total.
    pub total_questions: usize,
    /// Questions asked so far.
    pub questions: Vec<String>,
    /// Answers given so far.
    pub answers: Vec<String>,
    /// One evaluation per answer.
    pub evaluations: Vec<AnswerEvaluation>,
    /// Final report once completed.
    pub summary: Option<InterviewSummary>,
    /// Set when the final report could not be produced.
    pub summary_error: Option<String>,
    /// Lifecycle state.
    pub status: InterviewStatus,
    /// RFC 3339 start time.
    pub created_at: String,
    /// RFC 3339 time of the last answer.
    pub updated_at: String,
}

impl InterviewSession {
    /// Question awaiting an answer, if any.
    pub fn current_question(&self) -> Option<&str> {
        match self.status {
            InterviewStatus::InProgress if self.questions.len() > self.answers.len() => {
                self.questions.last().map(String::as_str)
            }
            _ => None,
        }
    }

    /// Whether every question has been answered.
    pub fn is_completed(&self) -> bool {
        self.status == InterviewStatus::Completed
    }

    /// Mean answer score on the 0..=10 scale.
    pub fn average_score(&self) -> Option<f64> {
        if self.evaluations.is_empty() {
            return None;
        }
        let total: u32 = self.evaluations.iter().map(|e| u32::from(e.score)).sum();
        Some(crate::text::round1(
            f64::from(total) / self.evaluations.len() as f64,
        ))
    }
}
