//! Handler for the `analyze-resume` tool.

use std::{path::Path, sync::Arc};

use crate::{mcp::format::resume_payload, service::CareerApi};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, JsonObject},
};
use serde::Deserialize;

use super::{map_service_error, parse_arguments};

/// Request payload accepted by the `analyze-resume` tool.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct AnalyzeResumeRequest {
    /// Pasted resume text.
    #[serde(default)]
    pub(crate) text: Option<String>,
    /// Path to a resume file readable by the server.
    #[serde(default)]
    pub(crate) path: Option<String>,
    /// Label for pasted text.
    #[serde(default)]
    pub(crate) filename: Option<String>,
}

/// Handle `analyze-resume` by parsing, analysing, and storing the resume.
pub(crate) async fn handle_analyze_resume(
    service: &Arc<dyn CareerApi>,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let args: AnalyzeResumeRequest = parse_arguments(arguments)?;
    let text = args.text.filter(|text| !text.trim().is_empty());

    let outcome = match (text, args.path) {
        (Some(text), _) => {
            let filename = args.filename.as_deref().unwrap_or("pasted.txt");
            service.process_resume_text(&text, filename).await
        }
        (None, Some(path)) => {
            let bytes = tokio::fs::read(&path).await.map_err(|err| {
                McpError::invalid_params(format!("Cannot read resume file {path}: {err}"), None)
            })?;
            let filename = Path::new(&path)
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(path.as_str())
                .to_string();
            service.process_resume(bytes, &filename).await
        }
        (None, None) => {
            return Err(McpError::invalid_params(
                "Provide either `text` or `path`",
                None,
            ));
        }
    }
    .map_err(map_service_error)?;

    Ok(CallToolResult::structured(resume_payload(&outcome)))
}
