//! Job point, hit, and wire types for the Qdrant job index.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned while interacting with Qdrant.
#[derive(Debug, Error)]
pub enum QdrantError {
    /// Base URL failed to parse.
    #[error("Invalid Qdrant URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Qdrant answered with a status the operation does not accept.
    #[error("Qdrant {operation} failed ({status}): {body}")]
    UnexpectedStatus {
        /// Short name of the failing call, e.g. `upsert`.
        operation: &'static str,
        /// HTTP status returned from Qdrant.
        status: StatusCode,
        /// Response body, for diagnostics.
        body: String,
    },
}

/// Posting metadata stored next to each job vector.
///
/// Text fields are truncated by [`crate::qdrant::job_payload`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPayload {
    /// Job-board identifier of the posting.
    pub job_id: String,
    /// Posting title.
    pub title: String,
    /// Hiring company.
    pub company: String,
    /// Display location.
    pub location: String,
    /// Application URL.
    pub url: String,
    /// Leading part of the description.
    pub description: String,
    /// Posting date as reported by the board.
    pub posted_date: String,
    /// Match run that wrote the point; queries are scoped to it.
    pub search_id: String,
}

/// Embedded posting ready for upsert.
#[derive(Debug, Clone)]
pub struct JobPoint {
    /// Run-scoped UUIDv5, see [`crate::qdrant::point_id_for_job`].
    pub id: String,
    /// Embedding of the posting text.
    pub vector: Vec<f32>,
    /// Metadata written alongside the vector.
    pub payload: JobPayload,
}

/// Nearest-neighbour result resolved to the posting it was indexed from.
#[derive(Debug, Clone, PartialEq)]
pub struct JobHit {
    /// Posting the point was indexed from.
    pub job_id: String,
    /// Raw cosine similarity as reported by Qdrant.
    pub score: f32,
}

#[derive(Deserialize)]
pub(crate) struct CollectionsEnvelope {
    pub(crate) result: CollectionList,
}

#[derive(Deserialize)]
pub(crate) struct CollectionList {
    pub(crate) collections: Vec<CollectionName>,
}

#[derive(Deserialize)]
pub(crate) struct CollectionName {
    pub(crate) name: String,
}

#[derive(Deserialize)]
pub(crate) struct QueryEnvelope {
    pub(crate) result: QueryResult,
}

/// `points/query` returns either a bare list or `{ "points": [...] }` depending on version.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum QueryResult {
    Bare(Vec<QueryPoint>),
    Wrapped {
        #[serde(default)]
        points: Vec<QueryPoint>,
    },
}

impl QueryResult {
    pub(crate) fn into_points(self) -> Vec<QueryPoint> {
        match self {
            Self::Bare(points) | Self::Wrapped { points } => points,
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct QueryPoint {
    pub(crate) score: f32,
    #[serde(default)]
    pub(crate) payload: Option<HitPayload>,
}

#[derive(Deserialize)]
pub(crate) struct HitPayload {
    #[serde(default)]
    pub(crate) job_id: Option<String>,
}
