//! Tool handlers for the MCP server.

use crate::service::ServiceError;
use rmcp::{ErrorData as McpError, model::JsonObject};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub mod interview;
pub mod matches;
pub mod reporting;
pub mod resume;

/// Parse structured arguments supplied to a tool invocation.
pub(crate) fn parse_arguments<T: DeserializeOwned>(
    arguments: Option<JsonObject>,
) -> Result<T, McpError> {
    let value = arguments
        .map(Value::Object)
        .unwrap_or_else(|| Value::Object(JsonObject::new()));
    serde_json::from_value(value)
        .map_err(|err| McpError::invalid_params(format!("Invalid arguments: {err}"), None))
}

/// Caller mistakes become `invalid_params`; everything else is an internal error.
pub(crate) fn map_service_error(error: ServiceError) -> McpError {
    match error {
        ServiceError::InvalidInput(_) | ServiceError::NotFound(_) | ServiceError::Resume(_) => {
            McpError::invalid_params(error.to_string(), None)
        }
        other => {
            tracing::error!(error = %other, "MCP tool failed");
            McpError::internal_error(other.to_string(), None)
        }
    }
}

fn require_text(value: &str, field: &str) -> Result<(), McpError> {
    if value.trim().is_empty() {
        return Err(McpError::invalid_params(
            format!("`{field}` must not be empty"),
            None,
        ));
    }
    Ok(())
}
