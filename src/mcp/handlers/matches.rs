//! Handlers for the `match-jobs` and `list-matches` tools.

use std::sync::Arc;

use crate::{
    mcp::format::{format_scored_jobs, match_record_payload},
    service::{CareerApi, MatchRequest},
};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, JsonObject},
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{map_service_error, parse_arguments, require_text};

const DEFAULT_LIST_LIMIT: u32 = 20;
const MAX_LIST_LIMIT: u32 = 100;

/// Handle `match-jobs`: search, index, and rank postings for a stored profile.
pub(crate) async fn handle_match_jobs(
    service: &Arc<dyn CareerApi>,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let request: MatchRequest = parse_arguments(arguments)?;
    require_text(&request.job_seeker_id, "job_seeker_id")?;
    if request.min_salary.is_some_and(|salary| salary < 0.0) {
        return Err(McpError::invalid_params(
            "`min_salary` must be non-negative",
            None,
        ));
    }

    let outcome = service
        .match_jobs(request)
        .await
        .map_err(map_service_error)?;
    let (results, digest) = format_scored_jobs(&outcome.matches);

    let mut payload = json!({
        "jobSeekerId": outcome.job_seeker_id,
        "searchId": outcome.search_id,
        "keywords": outcome.keywords,
        "location": outcome.location,
        "mode": outcome.mode.label(),
        "jobsRetrieved": outcome.jobs_retrieved,
        "jobsIndexed": outcome.jobs_indexed,
        "matchesPersisted": outcome.matches_persisted,
        "salaryBand": outcome.salary_band,
        "matches": results,
    });
    if let (Some(digest), Some(map)) = (digest, payload.as_object_mut()) {
        map.insert("context".into(), Value::String(digest));
    }
    Ok(CallToolResult::structured(payload))
}

/// Request payload accepted by the `list-matches` tool.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ListMatchesRequest {
    pub(crate) job_seeker_id: String,
    #[serde(default)]
    pub(crate) min_score: Option<f64>,
    #[serde(default)]
    pub(crate) limit: Option<u32>,
}

/// Handle `list-matches`, returning stored matches best first.
pub(crate) async fn handle_list_matches(
    service: &Arc<dyn CareerApi>,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let args: ListMatchesRequest = parse_arguments(arguments)?;
    require_text(&args.job_seeker_id, "job_seeker_id")?;
    let min_score = args.min_score.unwrap_or(0.0).clamp(0.0, 100.0);
    let limit = args
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    let records = service
        .list_matches(&args.job_seeker_id, min_score, limit)
        .await
        .map_err(map_service_error)?;
    let matches: Vec<Value> = records.iter().map(match_record_payload).collect();

    Ok(CallToolResult::structured(json!({
        "jobSeekerId": args.job_seeker_id,
        "minScore": min_score,
        "count": matches.len(),
        "matches": matches,
    })))
}
