//! Qdrant vector store integration for job postings.

pub mod client;
pub mod payload;
pub mod types;

pub use client::QdrantService;
pub use payload::{job_payload, point_id_for_job};
pub use types::{JobHit, JobPayload, JobPoint, QdrantError};
