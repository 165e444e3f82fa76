//! Formatting helpers shared across MCP handlers and resources.

use crate::{
    config::{EmbeddingProvider, SearchMode},
    matching::ScoredJob,
    service::{HealthSnapshot, ResumeOutcome},
    store::MatchRecord,
};
use rmcp::model::ResourceContents;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{Map, Value, json};

pub(crate) const APPLICATION_JSON: &str = "application/json";

/// Search depth presets returned by the `search-modes` resource.
#[derive(Debug, Serialize, JsonSchema)]
pub(crate) struct SearchModesSnapshot {
    /// Presets from shallowest to deepest.
    pub(crate) modes: Vec<SearchModeSnapshot>,
    /// Preset used when callers omit `mode`.
    pub(crate) default: &'static str,
}

/// One search depth preset.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchModeSnapshot {
    pub(crate) mode: &'static str,
    /// Postings requested from the job board.
    pub(crate) jobs: usize,
    pub(crate) estimated_seconds: u64,
}

/// Describe the search depth presets.
pub(crate) fn search_modes_payload(uri: &str) -> String {
    let snapshot = SearchModesSnapshot {
        modes: SearchMode::ALL
            .iter()
            .map(|mode| SearchModeSnapshot {
                mode: mode.label(),
                jobs: mode.job_count(),
                estimated_seconds: mode.estimated_seconds(),
            })
            .collect(),
        default: SearchMode::default().label(),
    };
    serialize_json(&snapshot, uri)
}

/// Build the health payload summarizing embedding, database, and Qdrant status.
pub(crate) fn health_payload(
    provider: EmbeddingProvider,
    model: &str,
    dimension: usize,
    qdrant_url: &str,
    collection: &str,
    snapshot: &HealthSnapshot,
) -> String {
    let mut qdrant = Map::new();
    qdrant.insert("url".into(), Value::String(qdrant_url.to_string()));
    qdrant.insert("reachable".into(), Value::Bool(snapshot.qdrant_reachable));
    qdrant.insert("collection".into(), Value::String(collection.to_string()));
    qdrant.insert(
        "collectionPresent".into(),
        Value::Bool(snapshot.collection_present),
    );

    let mut payload = Map::new();
    payload.insert("healthy".into(), Value::Bool(snapshot.is_healthy()));
    payload.insert(
        "embedding".into(),
        json!({
            "provider": embedding_provider_label(provider),
            "model": model,
            "dimension": dimension,
        }),
    );
    payload.insert("database".into(), json!({ "ok": snapshot.database_ok }));
    payload.insert("qdrant".into(), Value::Object(qdrant));
    if !snapshot.errors.is_empty() {
        payload.insert("errors".into(), json!(snapshot.errors));
    }

    let payload = Value::Object(payload);
    serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string())
}

fn embedding_provider_label(provider: EmbeddingProvider) -> &'static str {
    match provider {
        EmbeddingProvider::Azure => "azure",
        EmbeddingProvider::OpenAI => "openai",
        EmbeddingProvider::Hash => "hash",
    }
}

/// Compact profile view returned by `analyze-resume`.
pub(crate) fn resume_payload(outcome: &ResumeOutcome) -> Value {
    let profile = &outcome.profile;
    let analysis = &profile.analysis;
    json!({
        "jobSeekerId": profile.job_seeker_id,
        "reusedExisting": outcome.reused_existing,
        "wordCount": outcome.word_count,
        "primaryRole": analysis.primary_role,
        "seniorityLevel": analysis.seniority_level,
        "confidence": analysis.confidence,
        "skills": profile.skills(),
        "searchTerms": analysis.simple_search_terms,
        "locationPreference": analysis.location_preference,
        "industries": analysis.industries,
    })
}

/// Format ranked matches and a prompt-ready digest, one line per job.
pub(crate) fn format_scored_jobs(matches: &[ScoredJob]) -> (Vec<Value>, Option<String>) {
    let mut results = Vec::with_capacity(matches.len());
    let mut lines = Vec::new();
    for (rank, scored) in matches.iter().enumerate() {
        let job = &scored.job;
        lines.push(format!(
            "{}. {} at {} ({}) - {:.1}% [{}]",
            rank + 1,
            job.title,
            job.company,
            job.location,
            scored.combined_score,
            job.id
        ));
        results.push(json!({
            "jobId": job.id,
            "title": job.title,
            "company": job.company,
            "location": job.location,
            "url": job.url,
            "matchScore": scored.combined_score,
            "semanticScore": scored.semantic_score,
            "skillMatchScore": scored.skill_match_score,
            "matchedSkills": scored.matched_skills,
            "missingSkills": scored.missing_skills,
        }));
    }
    let digest = (!lines.is_empty()).then(|| lines.join("\n"));
    (results, digest)
}

/// Stored match view returned by `list-matches`.
pub(crate) fn match_record_payload(record: &MatchRecord) -> Value {
    json!({
        "jobId": record.job_id,
        "title": record.job_title,
        "company": record.company_name,
        "location": record.location,
        "url": record.application_url,
        "matchScore": record.match_percentage,
        "semanticScore": record.semantic_score,
        "skillMatchScore": record.skill_match_score,
        "matchedSkills": record.matched_skills,
        "missingSkills": record.missing_skills,
        "matchedAt": record.matched_at,
    })
}

/// Serialize a value to JSON, falling back to compact formatting on error.
pub(crate) fn serialize_json<T: Serialize>(value: &T, context_uri: &str) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|error| {
        tracing::warn!(uri = context_uri, %error, "Failed to serialize JSON prettily");
        serde_json::to_string(value).unwrap_or_else(|_| "{}".into())
    })
}

/// Build JSON resource contents for MCP resource responses.
pub(crate) fn json_resource_contents(uri: &str, text: String) -> ResourceContents {
    ResourceContents::TextResourceContents {
        uri: uri.to_string(),
        mime_type: Some(APPLICATION_JSON.into()),
        text,
        meta: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobPosting;
    use crate::matching::score_job;

    #[test]
    fn search_modes_payload_lists_presets() {
        let value: Value =
            serde_json::from_str(&search_modes_payload("mcp://search-modes")).expect("valid JSON");
        assert_eq!(value["default"], "quick");
        let modes = value["modes"].as_array().expect("modes array");
        assert_eq!(modes.len(), 3);
        assert_eq!(modes[2]["mode"], "deep");
        assert_eq!(modes[2]["jobs"], 40);
        assert_eq!(modes[1]["estimatedSeconds"], 60);
    }

    #[test]
    fn search_modes_snapshot_schema_names_fields() {
        let schema = serde_json::to_value(schemars::schema_for!(SearchModesSnapshot))
            .expect("schema serializes");
        assert!(schema["properties"]["modes"].is_object());
        assert!(schema["properties"]["default"].is_object());
    }

    #[test]
    fn health_payload_captures_probe_failures() {
        let snapshot = HealthSnapshot {
            database_ok: true,
            qdrant_reachable: false,
            collection_present: false,
            errors: vec!["qdrant: connection refused".into()],
        };

        let body = health_payload(
            EmbeddingProvider::Hash,
            "hash",
            8,
            "http://127.0.0.1:6333",
            "careerlens-jobs",
            &snapshot,
        );

        let value: Value = serde_json::from_str(&body).expect("health payload must be valid JSON");
        assert_eq!(value["healthy"], false);
        assert_eq!(value["embedding"]["provider"], "hash");
        assert_eq!(value["database"]["ok"], true);
        assert_eq!(value["qdrant"]["reachable"], false);
        assert_eq!(value["errors"][0], "qdrant: connection refused");
    }

    #[test]
    fn scored_jobs_digest_is_ranked() {
        let job = JobPosting {
            id: "li-7".into(),
            title: "Data Analyst".into(),
            company: "Acme".into(),
            location: "Remote".into(),
            description: "SQL dashboards".into(),
            ..JobPosting::default()
        };
        let scored = score_job(job, 0.5, &["sql".to_string()]);
        let (results, digest) = format_scored_jobs(&[scored]);
        assert_eq!(results[0]["matchScore"], 70.0);
        assert_eq!(results[0]["matchedSkills"][0], "sql");
        assert_eq!(
            digest.as_deref(),
            Some("1. Data Analyst at Acme (Remote) - 70.0% [li-7]")
        );
        assert_eq!(format_scored_jobs(&[]).1, None);
    }
}
