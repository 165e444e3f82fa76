//! JSON schema builders for MCP tools.

use crate::config::SearchMode;
use serde_json::{Map, Value};

/// Schema for `analyze-resume`: pasted text or a local file path.
pub(crate) fn analyze_resume_input_schema() -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(
        "text".into(),
        string_schema("Resume contents pasted as plain text"),
    );
    properties.insert(
        "path".into(),
        string_schema("Local path to a PDF, DOCX, or TXT resume; used when `text` is absent"),
    );
    properties.insert(
        "filename".into(),
        string_schema("Label stored with pasted text (defaults to 'pasted.txt')"),
    );
    finalize_object_schema(properties, &[])
}

/// Schema for `match-jobs`.
pub(crate) fn match_jobs_input_schema() -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert("job_seeker_id".into(), seeker_schema());
    properties.insert(
        "keywords".into(),
        string_schema("Search keywords; defaults to the detected primary role"),
    );
    properties.insert(
        "location".into(),
        string_schema("Search location; defaults to DEFAULT_JOB_LOCATION"),
    );

    let mut mode_schema = Map::new();
    mode_schema.insert("type".into(), Value::String("string".into()));
    mode_schema.insert(
        "description".into(),
        Value::String("Search depth; see mcp://search-modes".into()),
    );
    mode_schema.insert(
        "enum".into(),
        Value::Array(
            SearchMode::ALL
                .iter()
                .map(|mode| Value::String(mode.label().into()))
                .collect(),
        ),
    );
    mode_schema.insert(
        "default".into(),
        Value::String(SearchMode::default().label().into()),
    );
    properties.insert("mode".into(), Value::Object(mode_schema));

    properties.insert(
        "top_k".into(),
        integer_schema("Matches to keep (1-50, default 20)", 1),
    );
    properties.insert(
        "min_salary".into(),
        number_schema("Drop postings whose known salary is below this amount"),
    );
    finalize_object_schema(properties, &["job_seeker_id"])
}

/// Schema for `list-matches`.
pub(crate) fn list_matches_input_schema() -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert("job_seeker_id".into(), seeker_schema());
    properties.insert(
        "min_score".into(),
        number_schema("Minimum combined score, 0-100 (default 0)"),
    );
    properties.insert(
        "limit".into(),
        integer_schema("Maximum matches returned (default 20)", 1),
    );
    finalize_object_schema(properties, &["job_seeker_id"])
}

/// Schema for `start-interview`.
pub(crate) fn start_interview_input_schema() -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert("job_seeker_id".into(), seeker_schema());
    properties.insert(
        "job_id".into(),
        string_schema("Matched job to interview for (from list-matches)"),
    );
    properties.insert(
        "posting_id".into(),
        integer_schema("Recruiter posting to interview for; used when job_id is absent", 1),
    );
    finalize_object_schema(properties, &["job_seeker_id"])
}

/// Schema for `answer-interview`.
pub(crate) fn answer_interview_input_schema() -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(
        "session_id".into(),
        string_schema("Session identifier returned by start-interview"),
    );
    properties.insert(
        "answer".into(),
        string_schema("Candidate answer to the current question"),
    );
    finalize_object_schema(properties, &["session_id", "answer"])
}

/// Schema for `tailor-resume`.
pub(crate) fn tailor_resume_input_schema() -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert("job_seeker_id".into(), seeker_schema());
    properties.insert(
        "job_id".into(),
        string_schema("Matched job to tailor the resume for"),
    );
    finalize_object_schema(properties, &["job_seeker_id", "job_id"])
}

/// Schema for tools without arguments.
pub(crate) fn empty_object_schema() -> Map<String, Value> {
    finalize_object_schema(Map::new(), &[])
}

fn seeker_schema() -> Value {
    string_schema("Profile identifier returned by analyze-resume (e.g. JS_1A2B3C4D)")
}

fn string_schema(description: &str) -> Value {
    let mut schema = Map::new();
    schema.insert("type".into(), Value::String("string".into()));
    schema.insert("description".into(), Value::String(description.into()));
    Value::Object(schema)
}

fn integer_schema(description: &str, minimum: u64) -> Value {
    let mut schema = Map::new();
    schema.insert("type".into(), Value::String("integer".into()));
    schema.insert("description".into(), Value::String(description.into()));
    schema.insert("minimum".into(), Value::Number(minimum.into()));
    Value::Object(schema)
}

fn number_schema(description: &str) -> Value {
    let mut schema = Map::new();
    schema.insert("type".into(), Value::String("number".into()));
    schema.insert("description".into(), Value::String(description.into()));
    schema.insert("minimum".into(), Value::Number(0.into()));
    Value::Object(schema)
}

fn finalize_object_schema(properties: Map<String, Value>, required: &[&str]) -> Map<String, Value> {
    let mut schema = Map::new();
    schema.insert("type".into(), Value::String("object".into()));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert(
            "required".into(),
            Value::Array(
                required
                    .iter()
                    .map(|&key| Value::String(key.into()))
                    .collect(),
            ),
        );
    }
    schema.insert("additionalProperties".into(), Value::Bool(false));
    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_schema_lists_modes_and_requires_seeker() {
        let schema = match_jobs_input_schema();
        assert_eq!(schema["required"], serde_json::json!(["job_seeker_id"]));
        let modes = schema["properties"]["mode"]["enum"]
            .as_array()
            .expect("mode enum");
        assert_eq!(modes.len(), 3);
        assert_eq!(schema["properties"]["mode"]["default"], "quick");
    }

    #[test]
    fn empty_schema_rejects_extra_properties() {
        let schema = empty_object_schema();
        assert_eq!(schema["additionalProperties"], Value::Bool(false));
        assert!(!schema.contains_key("required"));
    }
}
