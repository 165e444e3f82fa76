//! Mapping of heterogeneous job-board payloads into [`JobPosting`] values.

use super::salary::{extract_salary, parse_salary_raw};
use super::JobPosting;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Pull the list of job objects out of a response body.
///
/// Providers return either a bare array or an object wrapping it under `data`, `jobs`, or
/// `results`.
pub fn extract_items(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut object) => ["data", "jobs", "results"]
            .into_iter()
            .find_map(|key| match object.remove(key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Convert raw provider items into postings, skipping anything that is not an object.
pub fn normalize_jobs(items: Vec<Value>) -> Vec<JobPosting> {
    let mut postings = Vec::with_capacity(items.len());
    for item in items {
        let Value::Object(job) = item else {
            tracing::debug!("Skipping non-object job payload");
            continue;
        };
        let fallback_id = format!("job_{}", postings.len());
        postings.push(normalize_job(&job, fallback_id));
    }
    postings
}

fn normalize_job(job: &Map<String, Value>, fallback_id: String) -> JobPosting {
    let id = match job.get("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => id.trim().to_string(),
        Some(Value::Number(id)) => id.to_string(),
        _ => fallback_id,
    };
    let description = text(job, "description_text")
        .or_else(|| text(job, "description"))
        .unwrap_or_default();
    let salary = job
        .get("salary_raw")
        .and_then(parse_salary_raw)
        .or_else(|| extract_salary(&description));

    JobPosting {
        id,
        title: text(job, "title").unwrap_or_else(|| "Unknown Title".into()),
        company: text(job, "organization")
            .or_else(|| text(job, "company"))
            .unwrap_or_else(|| "Unknown Company".into()),
        location: location(job),
        url: text(job, "url").unwrap_or_default(),
        posted_date: text(job, "date_posted").unwrap_or_else(|| "Unknown".into()),
        employment_type: first_text(job.get("employment_type")),
        skills: job
            .get("skills")
            .and_then(Value::as_array)
            .map(|skills| {
                skills
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|skill| !skill.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        description,
        salary,
    }
}

fn text(job: &Map<String, Value>, key: &str) -> Option<String> {
    job.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn first_text(value: Option<&Value>) -> Option<String> {
    let candidate = match value? {
        Value::Array(items) => items.first()?.as_str()?,
        Value::String(text) => text.as_str(),
        _ => return None,
    };
    let candidate = candidate.trim();
    (!candidate.is_empty()).then(|| candidate.to_string())
}

fn location(job: &Map<String, Value>) -> String {
    if let Some(derived) = first_text(job.get("locations_derived")) {
        return derived;
    }

    let address = job
        .get("locations_raw")
        .and_then(Value::as_array)
        .and_then(|raw| raw.first())
        .and_then(|entry| entry.get("address"));
    if let Some(address) = address {
        let locality = address
            .get("addressLocality")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let region = address
            .get("addressRegion")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !locality.is_empty() && !region.is_empty() {
            return format!("{locality}, {region}");
        }
    }

    "Remote".to_string()
}

/// Drop repeated postings, first by id and then by a title/company/location fingerprint.
pub fn dedupe_jobs(jobs: Vec<JobPosting>) -> Vec<JobPosting> {
    let mut seen_ids = HashSet::new();
    let mut seen_fingerprints = HashSet::new();
    let total = jobs.len();

    let unique: Vec<JobPosting> = jobs
        .into_iter()
        .filter(|job| {
            seen_ids.insert(job.id.clone()) && seen_fingerprints.insert(fingerprint(job))
        })
        .collect();

    if unique.len() < total {
        tracing::debug!(
            removed = total - unique.len(),
            kept = unique.len(),
            "Removed duplicate postings"
        );
    }
    unique
}

fn fingerprint(job: &JobPosting) -> String {
    let mut hasher = Sha256::new();
    for part in [&job.title, &job.company, &job.location] {
        hasher.update(part.trim().to_lowercase().as_bytes());
        hasher.update([0x1f]);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn items_are_found_under_known_keys() {
        assert_eq!(extract_items(json!([{ "id": 1 }])).len(), 1);
        assert_eq!(extract_items(json!({ "jobs": [{}, {}] })).len(), 2);
        assert_eq!(extract_items(json!({ "results": [{}] })).len(), 1);
        assert!(extract_items(json!({ "data": "nope" })).is_empty());
        assert!(extract_items(json!("text")).is_empty());
    }

    #[test]
    fn normalization_applies_defaults() {
        let jobs = normalize_jobs(vec![json!({}), json!("skip me"), json!({ "id": 42 })]);
        assert_eq!(jobs.len(), 2);

        let first = &jobs[0];
        assert_eq!(first.id, "job_0");
        assert_eq!(first.title, "Unknown Title");
        assert_eq!(first.company, "Unknown Company");
        assert_eq!(first.location, "Remote");
        assert_eq!(first.posted_date, "Unknown");
        assert!(first.salary.is_none());

        assert_eq!(jobs[1].id, "42");
    }

    #[test]
    fn normalization_reads_provider_fields() {
        let jobs = normalize_jobs(vec![
            json!({
                "id": "li-1",
                "title": "Data Analyst",
                "organization": "Acme",
                "locations_derived": ["Austin, Texas, United States"],
                "description_text": "Build dashboards. $70,000 - $90,000 a year.",
                "url": "https://jobs.example/li-1",
                "date_posted": "2026-10-01T00:00:00",
                "employment_type": ["FULL_TIME"]
            }),
            json!({
                "id": "li-2",
                "locations_raw": [{ "address": { "addressLocality": "Denver", "addressRegion": "CO" } }],
                "salary_raw": { "currency": "USD", "value": { "minValue": 100000, "maxValue": 140000, "unitText": "YEAR" } }
            }),
        ]);

        let first = &jobs[0];
        assert_eq!(first.company, "Acme");
        assert_eq!(first.location, "Austin, Texas, United States");
        assert_eq!(first.employment_type.as_deref(), Some("FULL_TIME"));
        let salary = first.salary.as_ref().unwrap();
        assert_eq!(salary.min, Some(70_000.0));
        assert_eq!(salary.period.as_deref(), Some("year"));

        let second = &jobs[1];
        assert_eq!(second.location, "Denver, CO");
        assert_eq!(second.salary.as_ref().unwrap().max, Some(140_000.0));
    }

    #[test]
    fn dedupe_drops_repeated_ids_and_reposts() {
        let job = |id: &str, title: &str| JobPosting {
            id: id.into(),
            title: title.into(),
            company: "Acme".into(),
            location: "Remote".into(),
            ..JobPosting::default()
        };
        let unique = dedupe_jobs(vec![
            job("1", "Analyst"),
            job("1", "Analyst II"),
            job("2", "ANALYST "),
            job("3", "Engineer"),
        ]);
        let ids: Vec<_> = unique.iter().map(|job| job.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }
}
