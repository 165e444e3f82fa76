use super::{
    AnswerEvaluation, InterviewError, InterviewJob, InterviewSession, InterviewStatus,
    InterviewSummary,
};
use crate::llm::prompts::{
    EVALUATOR_SYSTEM, INTERVIEWER_SYSTEM, evaluation_prompt, first_question_prompt,
    follow_up_question_prompt, summary_prompt,
};
use crate::llm::{CompletionClient, CompletionRequest, LlmError, complete_json};
use crate::resume::StructuredProfile;
use crate::store::current_timestamp_rfc3339;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

const SUMMARY_PARSE_FAILED: &str = "Summary parsing failed";

/// Result of submitting one answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerOutcome {
    /// Evaluation of the submitted answer.
    pub evaluation: AnswerEvaluation,
    /// Next question when the interview continues.
    pub next_question: Option<String>,
    /// Final report when this was the last answer and it could be produced.
    pub summary: Option<InterviewSummary>,
    /// Whether the session is now completed.
    pub completed: bool,
}

#[derive(Debug, Default, Deserialize)]
struct RawEvaluation {
    #[serde(default)]
    score: Value,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    improvements: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSummary {
    #[serde(default)]
    overall_score: Value,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    key_strengths: Vec<String>,
    #[serde(default)]
    improvement_areas: Vec<String>,
    #[serde(default)]
    job_fit: String,
    #[serde(default)]
    recommendations: Vec<String>,
}

/// Read a model score given as a number or numeric string and clamp it to `0..=max`.
fn clamp_score(value: &Value, max: u8) -> u8 {
    let raw = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().split('/').next().and_then(|s| s.trim().parse().ok()),
        _ => None,
    };
    match raw {
        Some(score) if score.is_finite() => score.round().clamp(0.0, f64::from(max)) as u8,
        _ => 0,
    }
}

fn normalize_job_fit(value: &str) -> String {
    let lowered = value.to_lowercase();
    if lowered.contains("high") {
        "High".into()
    } else if lowered.contains("low") {
        "Low".into()
    } else {
        "Medium".into()
    }
}

async fn ask(client: &dyn CompletionClient, prompt: String) -> Result<String, LlmError> {
    let request = CompletionRequest::new(INTERVIEWER_SYSTEM, prompt)
        .temperature(0.8)
        .max_tokens(500);
    let question = client.complete(request).await?.trim().to_string();
    if question.is_empty() {
        return Err(LlmError::EmptyContent);
    }
    Ok(question)
}

async fn evaluate(
    client: &dyn CompletionClient,
    job: &InterviewJob,
    question: &str,
    answer: &str,
) -> Result<AnswerEvaluation, LlmError> {
    let request = CompletionRequest::new(EVALUATOR_SYSTEM, evaluation_prompt(job, question, answer))
        .temperature(0.7)
        .max_tokens(800);
    let raw: RawEvaluation = complete_json(client, request).await?;
    Ok(AnswerEvaluation {
        score: clamp_score(&raw.score, 10),
        feedback: raw.feedback.trim().to_string(),
        strengths: raw.strengths,
        improvements: raw.improvements,
    })
}

async fn summarize(
    client: &dyn CompletionClient,
    job: &InterviewJob,
    transcript: &[(String, String, AnswerEvaluation)],
) -> Result<InterviewSummary, LlmError> {
    let request = CompletionRequest::new(EVALUATOR_SYSTEM, summary_prompt(job, transcript))
        .temperature(0.7)
        .max_tokens(1000);
    let raw: RawSummary = complete_json(client, request).await?;
    Ok(InterviewSummary {
        overall_score: clamp_score(&raw.overall_score, 100),
        summary: raw.summary.trim().to_string(),
        key_strengths: raw.key_strengths,
        improvement_areas: raw.improvement_areas,
        job_fit: normalize_job_fit(&raw.job_fit),
        recommendations: raw.recommendations,
    })
}

/// Open a session and generate its first question.
pub async fn start_interview(
    client: &dyn CompletionClient,
    job_seeker_id: &str,
    job: InterviewJob,
    candidate: &StructuredProfile,
    total_questions: usize,
) -> Result<InterviewSession, InterviewError> {
    let question = ask(client, first_question_prompt(&job, candidate)).await?;
    let now = current_timestamp_rfc3339();
    let session = InterviewSession {
        session_id: Uuid::new_v4().to_string(),
        job_seeker_id: job_seeker_id.to_string(),
        job,
        total_questions: total_questions.max(1),
        questions: vec![question],
        answers: Vec::new(),
        evaluations: Vec::new(),
        summary: None,
        summary_error: None,
        status: InterviewStatus::InProgress,
        created_at: now.clone(),
        updated_at: now,
    };
    info!(
        session_id = %session.session_id,
        job_seeker_id,
        job_id = %session.job.job_id,
        total_questions = session.total_questions,
        "Interview started"
    );
    Ok(session)
}

/// Evaluate `answer` to the current question and advance the session.
///
/// The session is only modified once every model call for this step has succeeded, so a failed
/// evaluation or follow-up question can be retried with the same answer.
pub async fn submit_answer(
    client: &dyn CompletionClient,
    session: &mut InterviewSession,
    candidate: &StructuredProfile,
    answer: &str,
) -> Result<AnswerOutcome, InterviewError> {
    if session.is_completed() {
        return Err(InterviewError::AlreadyCompleted);
    }
    let answer = answer.trim();
    if answer.is_empty() {
        return Err(InterviewError::EmptyAnswer);
    }
    let question = session
        .current_question()
        .ok_or(InterviewError::AlreadyCompleted)?
        .to_string();

    let evaluation = evaluate(client, &session.job, &question, answer).await?;
    let answered = session.answers.len() + 1;

    if answered < session.total_questions {
        let mut history: Vec<(String, String)> = session
            .questions
            .iter()
            .cloned()
            .zip(session.answers.iter().cloned())
            .collect();
        history.push((question, answer.to_string()));
        let prompt = follow_up_question_prompt(
            &session.job,
            candidate,
            &history,
            answered + 1,
            session.total_questions,
        );
        let next = ask(client, prompt).await?;

        session.answers.push(answer.to_string());
        session.evaluations.push(evaluation.clone());
        session.questions.push(next.clone());
        session.updated_at = current_timestamp_rfc3339();
        return Ok(AnswerOutcome {
            evaluation,
            next_question: Some(next),
            summary: None,
            completed: false,
        });
    }

    session.answers.push(answer.to_string());
    session.evaluations.push(evaluation.clone());
    let transcript: Vec<(String, String, AnswerEvaluation)> = session
        .questions
        .iter()
        .cloned()
        .zip(session.answers.iter().cloned())
        .zip(session.evaluations.iter().cloned())
        .map(|((q, a), e)| (q, a, e))
        .collect();

    match summarize(client, &session.job, &transcript).await {
        Ok(summary) => session.summary = Some(summary),
        Err(error) => {
            warn!(session_id = %session.session_id, error = %error, "Interview summary failed");
            session.summary_error = Some(SUMMARY_PARSE_FAILED.to_string());
        }
    }
    session.status = InterviewStatus::Completed;
    session.updated_at = current_timestamp_rfc3339();
    info!(
        session_id = %session.session_id,
        average_score = ?session.average_score(),
        "Interview completed"
    );

    Ok(AnswerOutcome {
        evaluation,
        next_question: None,
        summary: session.summary.clone(),
        completed: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedClient;

    fn job() -> InterviewJob {
        InterviewJob {
            job_id: "job-1".into(),
            title: "Data Analyst".into(),
            company: "Acme".into(),
            description: "Build dashboards.".into(),
            required_skills: "SQL".into(),
            ..InterviewJob::default()
        }
    }

    const EVAL: &str = r#"{"score": 8, "feedback": "Clear.", "strengths": ["structure"], "improvements": []}"#;
    const SUMMARY: &str = r#"{"overall_score": 82, "summary": "Solid.", "key_strengths": ["SQL"],
        "improvement_areas": ["depth"], "job_fit": "high", "recommendations": ["practice"]}"#;

    #[tokio::test]
    async fn full_interview_flow() {
        let client = ScriptedClient::new([
            "  Tell me about a dashboard you built. ",
            EVAL,
            "How did you validate the data?",
            EVAL,
            SUMMARY,
        ]);
        let candidate = StructuredProfile::default();

        let mut session = start_interview(&client, "JS_1", job(), &candidate, 2)
            .await
            .expect("session");
        assert_eq!(
            session.current_question(),
            Some("Tell me about a dashboard you built.")
        );

        let first = submit_answer(&client, &mut session, &candidate, "A sales dashboard.")
            .await
            .expect("first answer");
        assert!(!first.completed);
        assert_eq!(
            first.next_question.as_deref(),
            Some("How did you validate the data?")
        );
        assert_eq!(session.status, InterviewStatus::InProgress);

        let second = submit_answer(&client, &mut session, &candidate, "Row counts.")
            .await
            .expect("second answer");
        assert!(second.completed);
        let summary = second.summary.expect("summary");
        assert_eq!(summary.overall_score, 82);
        assert_eq!(summary.job_fit, "High");
        assert_eq!(session.status, InterviewStatus::Completed);
        assert_eq!(session.answers.len(), 2);
        assert_eq!(session.average_score(), Some(8.0));

        let requests = client.recorded();
        assert_eq!(requests[0].temperature, 0.8);
        assert_eq!(requests[0].max_tokens, 500);
        assert!(requests[1].json_mode);
        assert_eq!(requests[1].max_tokens, 800);
        assert!(requests[2].prompt.contains("A1: A sales dashboard."));
        assert_eq!(requests[4].max_tokens, 1000);
    }

    #[tokio::test]
    async fn rejects_blank_and_late_answers() {
        let client = ScriptedClient::new(["Q1?", EVAL, "not json"]);
        let candidate = StructuredProfile::default();
        let mut session = start_interview(&client, "JS_1", job(), &candidate, 1)
            .await
            .unwrap();

        assert!(matches!(
            submit_answer(&client, &mut session, &candidate, "   ").await,
            Err(InterviewError::EmptyAnswer)
        ));

        let outcome = submit_answer(&client, &mut session, &candidate, "Answer")
            .await
            .unwrap();
        assert!(outcome.completed);
        assert!(outcome.summary.is_none());
        assert_eq!(session.summary_error.as_deref(), Some("Summary parsing failed"));

        assert!(matches!(
            submit_answer(&client, &mut session, &candidate, "Again").await,
            Err(InterviewError::AlreadyCompleted)
        ));
    }

    #[tokio::test]
    async fn failed_evaluation_leaves_session_untouched() {
        let client = ScriptedClient::new(["Q1?", "garbage"]);
        let candidate = StructuredProfile::default();
        let mut session = start_interview(&client, "JS_1", job(), &candidate, 2)
            .await
            .unwrap();
        let before = session.clone();

        let result = submit_answer(&client, &mut session, &candidate, "Answer").await;
        assert!(matches!(result, Err(InterviewError::Llm(_))));
        assert_eq!(session, before);
    }

    #[tokio::test]
    async fn start_fails_without_a_question() {
        let client = ScriptedClient::failing();
        let result =
            start_interview(&client, "JS_1", job(), &StructuredProfile::default(), 2).await;
        assert!(matches!(result, Err(InterviewError::Llm(_))));
    }

    #[test]
    fn scores_are_clamped() {
        assert_eq!(clamp_score(&serde_json::json!(14), 10), 10);
        assert_eq!(clamp_score(&serde_json::json!(-3), 10), 0);
        assert_eq!(clamp_score(&serde_json::json!(7.6), 10), 8);
        assert_eq!(clamp_score(&serde_json::json!("7/10"), 10), 7);
        assert_eq!(clamp_score(&serde_json::json!(null), 100), 0);
        assert_eq!(clamp_score(&serde_json::json!(250), 100), 100);
    }
}
