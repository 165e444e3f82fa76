//! Handlers for `tailor-resume` and `usage`.

use std::sync::Arc;

use crate::service::CareerApi;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, JsonObject},
};
use serde::Deserialize;
use serde_json::json;

use super::{map_service_error, parse_arguments, require_text};

/// Request payload accepted by the `tailor-resume` tool.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TailorResumeRequest {
    pub(crate) job_seeker_id: String,
    pub(crate) job_id: String,
}

/// Handle `tailor-resume`, returning the structured resume and its text rendering.
pub(crate) async fn handle_tailor_resume(
    service: &Arc<dyn CareerApi>,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let args: TailorResumeRequest = parse_arguments(arguments)?;
    require_text(&args.job_seeker_id, "job_seeker_id")?;
    require_text(&args.job_id, "job_id")?;

    let outcome = service
        .tailor_resume(&args.job_seeker_id, &args.job_id)
        .await
        .map_err(map_service_error)?;
    Ok(CallToolResult::structured(json!({
        "jobSeekerId": outcome.job_seeker_id,
        "jobId": outcome.job_id,
        "jobTitle": outcome.job_title,
        "resume": outcome.resume,
        "text": outcome.text,
    })))
}

/// Handle `usage`, returning token spend and platform counters.
pub(crate) async fn handle_usage(service: &Arc<dyn CareerApi>) -> Result<CallToolResult, McpError> {
    let usage = service.usage_summary();
    let metrics = service.metrics_snapshot();
    Ok(CallToolResult::structured(json!({
        "tokens": usage,
        "metrics": metrics,
    })))
}
