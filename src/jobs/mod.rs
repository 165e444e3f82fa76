//! Job-board search: the external API client, payload normalization, and salary analysis.
//!
//! Search results flow through [`normalize_jobs`] into [`JobPosting`] values that the matching
//! pipeline embeds and scores. [`search_with_fallback`] retries an empty search with broader
//! titles so a narrow role still yields postings to rank.

mod client;
mod normalize;
mod salary;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::{RapidApiJobBoard, search_with_fallback, simplify_query};
pub use normalize::{dedupe_jobs, extract_items, normalize_jobs};
pub use salary::{SalaryBand, extract_salary, filter_by_salary, parse_salary_raw, salary_band};

/// Errors raised while talking to the job board.
#[derive(Debug, Error)]
pub enum JobBoardError {
    /// No RapidAPI key is configured.
    #[error("Job board API key is not configured (set RAPIDAPI_KEY)")]
    MissingApiKey,
    /// The key was rejected.
    #[error("Job board API key is invalid or expired (403 Forbidden)")]
    Forbidden,
    /// The provider quota is exhausted.
    #[error("Job board rate limit exceeded (429 Too Many Requests)")]
    RateLimited,
    /// Any other non-success status.
    #[error("Job board returned status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// First part of the response body.
        body: String,
    },
    /// Base URL failed to parse.
    #[error("Invalid job board URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("Job board request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Salary information attached to a posting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    /// Lower bound, when known.
    pub min: Option<f64>,
    /// Upper bound, when known.
    pub max: Option<f64>,
    /// ISO currency code such as `USD` or `HKD`.
    pub currency: Option<String>,
    /// Pay period: `year`, `month`, `week`, `day`, or `hour`.
    pub period: Option<String>,
}

impl SalaryRange {
    /// Midpoint of the range, or whichever bound is present.
    pub fn midpoint(&self) -> Option<f64> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Some((min + max) / 2.0),
            (Some(value), None) | (None, Some(value)) => Some(value),
            (None, None) => None,
        }
    }
}

/// A normalized job-board posting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    /// Provider identifier, or a positional `job_{n}` fallback.
    pub id: String,
    /// Job title.
    pub title: String,
    /// Hiring organization.
    pub company: String,
    /// Display location.
    pub location: String,
    /// Plain-text description.
    pub description: String,
    /// Application link.
    pub url: String,
    /// Posting date as reported by the provider.
    pub posted_date: String,
    /// First employment type listed by the provider.
    #[serde(default)]
    pub employment_type: Option<String>,
    /// Salary from structured data or parsed from the description.
    #[serde(default)]
    pub salary: Option<SalaryRange>,
    /// Skills listed by the provider.
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Outcome of a job-board connectivity probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    /// Whether the probe succeeded.
    pub ok: bool,
    /// HTTP status, when a response arrived.
    pub status: Option<u16>,
    /// Human-readable description.
    pub message: String,
}

/// Interface implemented by job-board backends.
#[async_trait]
pub trait JobBoard {
    /// Search postings whose title matches `keywords` near `location`.
    async fn search_jobs(
        &self,
        keywords: &str,
        location: &str,
        limit: usize,
    ) -> Result<Vec<JobPosting>, JobBoardError>;

    /// Probe the API with a small fixed query.
    async fn test_connection(&self) -> ConnectionStatus;
}
