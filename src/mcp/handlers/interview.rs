//! Handlers for the mock interview tools.

use std::sync::Arc;

use crate::service::{CareerApi, InterviewTarget};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, JsonObject},
};
use serde::Deserialize;
use serde_json::json;

use super::{map_service_error, parse_arguments, require_text};

/// Handle `start-interview`, returning the session id and the first question.
pub(crate) async fn handle_start_interview(
    service: &Arc<dyn CareerApi>,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let target: InterviewTarget = parse_arguments(arguments)?;
    require_text(&target.job_seeker_id, "job_seeker_id")?;

    let session = service
        .start_interview(target)
        .await
        .map_err(map_service_error)?;
    Ok(CallToolResult::structured(json!({
        "sessionId": session.session_id,
        "jobId": session.job.job_id,
        "jobTitle": session.job.title,
        "company": session.job.company,
        "questionNumber": 1,
        "totalQuestions": session.total_questions,
        "question": session.current_question(),
    })))
}

/// Request payload accepted by the `answer-interview` tool.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct AnswerInterviewRequest {
    pub(crate) session_id: String,
    pub(crate) answer: String,
}

/// Handle `answer-interview`: evaluate the answer and advance the session.
pub(crate) async fn handle_answer_interview(
    service: &Arc<dyn CareerApi>,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let args: AnswerInterviewRequest = parse_arguments(arguments)?;
    require_text(&args.session_id, "session_id")?;
    require_text(&args.answer, "answer")?;

    let outcome = service
        .answer_interview(&args.session_id, &args.answer)
        .await
        .map_err(map_service_error)?;
    Ok(CallToolResult::structured(json!({
        "sessionId": args.session_id,
        "evaluation": outcome.evaluation,
        "nextQuestion": outcome.next_question,
        "completed": outcome.completed,
        "summary": outcome.summary,
    })))
}
