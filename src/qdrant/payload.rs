//! Payload and identifier helpers for job points.

use crate::jobs::JobPosting;
use crate::qdrant::types::JobPayload;
use crate::text::truncate_chars;
use serde_json::{Value, json};
use uuid::Uuid;

const SHORT_FIELD_CHARS: usize = 512;
const DESCRIPTION_CHARS: usize = 1000;
const POSTED_DATE_CHARS: usize = 100;

/// Point id for a posting indexed by one search run.
///
/// Stable within a run, so re-indexing overwrites; distinct across runs, so concurrent runs
/// over the same posting keep separate points.
pub fn point_id_for_job(search_id: &str, job_id: &str) -> String {
    let run = Uuid::new_v5(&Uuid::NAMESPACE_OID, search_id.as_bytes());
    Uuid::new_v5(&run, job_id.as_bytes()).to_string()
}

/// Metadata stored with each job vector, truncated to keep payloads small.
pub fn job_payload(job: &JobPosting, search_id: &str) -> JobPayload {
    let short = |value: &str| truncate_chars(value, SHORT_FIELD_CHARS).to_string();
    JobPayload {
        job_id: short(&job.id),
        title: short(&job.title),
        company: short(&job.company),
        location: short(&job.location),
        url: short(&job.url),
        description: truncate_chars(&job.description, DESCRIPTION_CHARS).to_string(),
        posted_date: truncate_chars(&job.posted_date, POSTED_DATE_CHARS).to_string(),
        search_id: short(search_id),
    }
}

/// Filter restricting a query to the points written by one search run.
pub(crate) fn search_scope_filter(search_id: &str) -> Value {
    json!({
        "must": [
            { "key": "search_id", "match": { "value": search_id } }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_ids_are_stable_uuids() {
        let first = point_id_for_job("run-a", "li-123");
        assert_eq!(first, point_id_for_job("run-a", "li-123"));
        assert_ne!(first, point_id_for_job("run-a", "li-124"));
        assert!(Uuid::parse_str(&first).is_ok());
    }

    #[test]
    fn overlapping_runs_get_separate_points() {
        assert_ne!(point_id_for_job("run-a", "li-123"), point_id_for_job("run-b", "li-123"));
        assert_ne!(point_id_for_job("run-a", "li-1"), point_id_for_job("run-al", "i-1"));
    }

    #[test]
    fn payload_truncates_long_fields() {
        let job = JobPosting {
            id: "job-1".into(),
            title: "T".repeat(600),
            description: "d".repeat(1500),
            ..JobPosting::default()
        };
        let payload = job_payload(&job, "run-1");
        assert_eq!(payload.title.len(), 512);
        assert_eq!(payload.description.len(), 1000);
        assert_eq!(payload.job_id, "job-1");
        assert_eq!(payload.search_id, "run-1");
    }
}
