//! HTTP surface for CareerLens.
//!
//! The Axum router groups endpoints by resource:
//!
//! - `POST /resumes?filename=cv.pdf` – Upload a PDF, DOCX, or text resume as the raw request body.
//! - `POST /resumes/text` – Analyse pasted resume text.
//! - `GET /profiles`, `GET /profiles/latest`, `GET /profiles/:id` – Browse stored profiles.
//! - `GET /profiles/:id/postings` – Recruiter postings ranked for a profile.
//! - `GET /profiles/:id/interviews` – Mock interviews held by a profile.
//! - `POST /matches` – Search the job board, index postings in Qdrant, and rank them.
//! - `GET /matches` – Profiles that have stored matches.
//! - `GET|DELETE /matches/:seeker_id`, `GET /matches/:seeker_id/{stats,recent}` – Stored matches.
//! - `DELETE /matches/:seeker_id/jobs/:job_id` – Drop one stored match.
//! - `POST|GET /postings`, `GET /postings/:id/candidates` – Recruiter postings and candidate ranking.
//! - `POST /interviews`, `GET /interviews/:id`, `POST /interviews/:id/answers` – Mock interviews.
//! - `POST /tailor` – Rewrite a resume for one matched job.
//! - `GET /market`, `GET /usage`, `GET /metrics`, `GET /health` – Reporting and probes.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//!
//! The HTTP surface drives the same [`CareerApi`] as the MCP server, so behavior is identical
//! across interfaces.

use crate::interview::{AnswerOutcome, InterviewSession};
use crate::matching::{CandidateAssessment, PostingScore};
use crate::metrics::MetricsSnapshot;
use crate::service::{
    CareerApi, HealthSnapshot, InterviewTarget, MatchOutcome, MatchRequest, ProfileSummary,
    ResumeOutcome, ServiceError, TailoredResumeOutcome,
};
use crate::store::{
    JobSeekerProfile, MarketOverview, MatchRecord, MatchStatistics, NewRecruiterPosting,
    RecruiterPosting,
};
use crate::usage::UsageSummary;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

const DEFAULT_LIST_LIMIT: u32 = 20;
const DEFAULT_RANK_LIMIT: usize = 10;

/// Build the HTTP router exposing the career API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: CareerApi + 'static,
{
    Router::new()
        .route("/resumes", post(upload_resume::<S>))
        .route("/resumes/text", post(submit_resume_text::<S>))
        .route("/profiles", get(list_profiles::<S>))
        .route("/profiles/latest", get(latest_profile::<S>))
        .route("/profiles/:id", get(get_profile::<S>))
        .route("/profiles/:id/postings", get(rank_postings::<S>))
        .route("/profiles/:id/interviews", get(list_interviews::<S>))
        .route("/matches", get(matched_seekers::<S>).post(match_jobs::<S>))
        .route(
            "/matches/:seeker_id",
            get(list_matches::<S>).delete(clear_matches::<S>),
        )
        .route("/matches/:seeker_id/stats", get(match_statistics::<S>))
        .route("/matches/:seeker_id/recent", get(recent_matches::<S>))
        .route("/matches/:seeker_id/jobs/:job_id", delete(delete_match::<S>))
        .route(
            "/postings",
            get(list_postings::<S>).post(create_posting::<S>),
        )
        .route("/postings/:id/candidates", get(rank_candidates::<S>))
        .route("/interviews", post(start_interview::<S>))
        .route("/interviews/:id", get(get_interview::<S>))
        .route("/interviews/:id/answers", post(answer_interview::<S>))
        .route("/tailor", post(tailor_resume::<S>))
        .route("/market", get(market_overview::<S>))
        .route("/usage", get(usage::<S>))
        .route("/metrics", get(metrics::<S>))
        .route("/health", get(health::<S>))
        .route("/commands", get(get_commands))
        .with_state(service)
}

/// Query string for `POST /resumes`.
#[derive(Deserialize)]
struct UploadParams {
    /// Original file name; its extension selects the parser.
    filename: String,
}

/// Parse, analyse, and store an uploaded resume file.
async fn upload_resume<S>(
    State(service): State<Arc<S>>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<Json<ResumeOutcome>, AppError>
where
    S: CareerApi,
{
    let outcome = service
        .process_resume(body.to_vec(), &params.filename)
        .await?;
    tracing::info!(
        job_seeker_id = %outcome.profile.job_seeker_id,
        filename = %params.filename,
        reused = outcome.reused_existing,
        "Resume upload completed"
    );
    Ok(Json(outcome))
}

/// Request body for `POST /resumes/text`.
#[derive(Deserialize)]
struct ResumeTextRequest {
    /// Resume contents.
    text: String,
    /// Label stored with the profile (defaults to `pasted.txt`).
    #[serde(default)]
    filename: Option<String>,
}

async fn submit_resume_text<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<ResumeTextRequest>,
) -> Result<Json<ResumeOutcome>, AppError>
where
    S: CareerApi,
{
    let filename = request.filename.as_deref().unwrap_or("pasted.txt");
    let outcome = service.process_resume_text(&request.text, filename).await?;
    Ok(Json(outcome))
}

/// Query string for `GET /profiles`.
#[derive(Deserialize)]
struct ProfileQuery {
    /// Skill, role, or location fragment.
    #[serde(default)]
    q: Option<String>,
}

/// Response body for `GET /profiles`.
#[derive(Serialize)]
struct ProfilesResponse {
    profiles: Vec<ProfileSummary>,
}

async fn list_profiles<S>(
    State(service): State<Arc<S>>,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<ProfilesResponse>, AppError>
where
    S: CareerApi,
{
    let profiles = service.list_profiles(query.q).await?;
    Ok(Json(ProfilesResponse { profiles }))
}

async fn get_profile<S>(
    State(service): State<Arc<S>>,
    Path(id): Path<String>,
) -> Result<Json<JobSeekerProfile>, AppError>
where
    S: CareerApi,
{
    Ok(Json(service.get_profile(&id).await?))
}

async fn latest_profile<S>(
    State(service): State<Arc<S>>,
) -> Result<Json<JobSeekerProfile>, AppError>
where
    S: CareerApi,
{
    Ok(Json(service.latest_profile().await?))
}

/// Response body for `GET /profiles/:id/interviews`.
#[derive(Serialize)]
struct InterviewsResponse {
    job_seeker_id: String,
    interviews: Vec<InterviewSession>,
}

async fn list_interviews<S>(
    State(service): State<Arc<S>>,
    Path(id): Path<String>,
) -> Result<Json<InterviewsResponse>, AppError>
where
    S: CareerApi,
{
    let interviews = service.list_interviews(&id).await?;
    Ok(Json(InterviewsResponse {
        job_seeker_id: id,
        interviews,
    }))
}

/// Query string shared by ranking endpoints.
#[derive(Deserialize)]
struct RankQuery {
    #[serde(default)]
    limit: Option<usize>,
}

async fn rank_postings<S>(
    State(service): State<Arc<S>>,
    Path(id): Path<String>,
    Query(query): Query<RankQuery>,
) -> Result<Json<Vec<PostingScore>>, AppError>
where
    S: CareerApi,
{
    let limit = query.limit.unwrap_or(DEFAULT_RANK_LIMIT);
    Ok(Json(service.rank_postings_for_seeker(&id, limit).await?))
}

/// Run a search, index, and match cycle.
///
/// Matches are persisted before the response is returned, so `GET /matches/:seeker_id` sees
/// them immediately.
async fn match_jobs<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchOutcome>, AppError>
where
    S: CareerApi,
{
    if request.job_seeker_id.trim().is_empty() {
        return Err(ServiceError::InvalidInput("job_seeker_id is required".into()).into());
    }
    let outcome = service.match_jobs(request).await?;
    tracing::info!(
        job_seeker_id = %outcome.job_seeker_id,
        retrieved = outcome.jobs_retrieved,
        matches = outcome.matches.len(),
        "Match request completed"
    );
    Ok(Json(outcome))
}

/// Query string for `GET /matches/:seeker_id`.
#[derive(Deserialize)]
struct MatchListQuery {
    /// Minimum combined score, 0..=100.
    #[serde(default)]
    min_score: Option<f64>,
    #[serde(default)]
    limit: Option<u32>,
}

/// Response body for `GET /matches/:seeker_id`.
#[derive(Serialize)]
struct MatchesResponse {
    job_seeker_id: String,
    matches: Vec<MatchRecord>,
}

async fn list_matches<S>(
    State(service): State<Arc<S>>,
    Path(seeker_id): Path<String>,
    Query(query): Query<MatchListQuery>,
) -> Result<Json<MatchesResponse>, AppError>
where
    S: CareerApi,
{
    let matches = service
        .list_matches(
            &seeker_id,
            query.min_score.unwrap_or(0.0),
            query.limit.unwrap_or(DEFAULT_LIST_LIMIT),
        )
        .await?;
    Ok(Json(MatchesResponse {
        job_seeker_id: seeker_id,
        matches,
    }))
}

/// Query string for `GET /matches/:seeker_id/recent`.
#[derive(Deserialize)]
struct RecentQuery {
    #[serde(default)]
    limit: Option<u32>,
}

async fn recent_matches<S>(
    State(service): State<Arc<S>>,
    Path(seeker_id): Path<String>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<MatchesResponse>, AppError>
where
    S: CareerApi,
{
    let matches = service
        .recent_matches(&seeker_id, query.limit.unwrap_or(DEFAULT_LIST_LIMIT))
        .await?;
    Ok(Json(MatchesResponse {
        job_seeker_id: seeker_id,
        matches,
    }))
}

/// Response body for `GET /matches`.
#[derive(Serialize)]
struct MatchedSeekersResponse {
    job_seeker_ids: Vec<String>,
}

async fn matched_seekers<S>(
    State(service): State<Arc<S>>,
) -> Result<Json<MatchedSeekersResponse>, AppError>
where
    S: CareerApi,
{
    let job_seeker_ids = service.matched_seekers().await?;
    Ok(Json(MatchedSeekersResponse { job_seeker_ids }))
}

async fn match_statistics<S>(
    State(service): State<Arc<S>>,
    Path(seeker_id): Path<String>,
) -> Result<Json<MatchStatistics>, AppError>
where
    S: CareerApi,
{
    Ok(Json(service.match_statistics(&seeker_id).await?))
}

/// Response body for the match deletion routes.
#[derive(Serialize)]
struct ClearedResponse {
    deleted: u64,
}

async fn clear_matches<S>(
    State(service): State<Arc<S>>,
    Path(seeker_id): Path<String>,
) -> Result<Json<ClearedResponse>, AppError>
where
    S: CareerApi,
{
    let deleted = service.clear_matches(&seeker_id).await?;
    Ok(Json(ClearedResponse { deleted }))
}

/// Remove one stored match; 404 when the pair was never matched.
async fn delete_match<S>(
    State(service): State<Arc<S>>,
    Path((seeker_id, job_id)): Path<(String, String)>,
) -> Result<Json<ClearedResponse>, AppError>
where
    S: CareerApi,
{
    service.delete_match(&seeker_id, &job_id).await?;
    Ok(Json(ClearedResponse { deleted: 1 }))
}

async fn create_posting<S>(
    State(service): State<Arc<S>>,
    Json(posting): Json<NewRecruiterPosting>,
) -> Result<(StatusCode, Json<RecruiterPosting>), AppError>
where
    S: CareerApi,
{
    let stored = service.create_posting(posting).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Query string for `GET /postings`.
#[derive(Deserialize)]
struct PostingQuery {
    /// Only postings whose `valid_until` is today or later.
    #[serde(default)]
    active_only: bool,
}

async fn list_postings<S>(
    State(service): State<Arc<S>>,
    Query(query): Query<PostingQuery>,
) -> Result<Json<Vec<RecruiterPosting>>, AppError>
where
    S: CareerApi,
{
    Ok(Json(service.list_postings(query.active_only).await?))
}

async fn rank_candidates<S>(
    State(service): State<Arc<S>>,
    Path(id): Path<i64>,
    Query(query): Query<RankQuery>,
) -> Result<Json<Vec<CandidateAssessment>>, AppError>
where
    S: CareerApi,
{
    let limit = query.limit.unwrap_or(DEFAULT_RANK_LIMIT);
    Ok(Json(service.rank_candidates(id, limit).await?))
}

async fn start_interview<S>(
    State(service): State<Arc<S>>,
    Json(target): Json<InterviewTarget>,
) -> Result<Json<InterviewSession>, AppError>
where
    S: CareerApi,
{
    Ok(Json(service.start_interview(target).await?))
}

async fn get_interview<S>(
    State(service): State<Arc<S>>,
    Path(id): Path<String>,
) -> Result<Json<InterviewSession>, AppError>
where
    S: CareerApi,
{
    Ok(Json(service.get_interview(&id).await?))
}

/// Request body for `POST /interviews/:id/answers`.
#[derive(Deserialize)]
struct AnswerRequest {
    answer: String,
}

async fn answer_interview<S>(
    State(service): State<Arc<S>>,
    Path(id): Path<String>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<AnswerOutcome>, AppError>
where
    S: CareerApi,
{
    Ok(Json(service.answer_interview(&id, &request.answer).await?))
}

/// Request body for `POST /tailor`.
#[derive(Deserialize)]
struct TailorRequest {
    job_seeker_id: String,
    job_id: String,
}

async fn tailor_resume<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<TailorRequest>,
) -> Result<Json<TailoredResumeOutcome>, AppError>
where
    S: CareerApi,
{
    let outcome = service
        .tailor_resume(&request.job_seeker_id, &request.job_id)
        .await?;
    Ok(Json(outcome))
}

async fn market_overview<S>(
    State(service): State<Arc<S>>,
) -> Result<Json<MarketOverview>, AppError>
where
    S: CareerApi,
{
    Ok(Json(service.market_overview().await?))
}

async fn usage<S>(State(service): State<Arc<S>>) -> Json<UsageSummary>
where
    S: CareerApi,
{
    Json(service.usage_summary())
}

/// Return platform counters for dashboards.
async fn metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: CareerApi,
{
    Json(service.metrics_snapshot())
}

/// Probe dependencies; answers 503 when the database or Qdrant is unreachable.
async fn health<S>(State(service): State<Arc<S>>) -> (StatusCode, Json<HealthSnapshot>)
where
    S: CareerApi,
{
    let snapshot = service.health().await;
    let status = if snapshot.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(snapshot))
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

impl CommandDescriptor {
    fn new(
        name: &'static str,
        method: &'static str,
        path: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            method,
            path,
            description,
            request_example: None,
        }
    }

    fn example(mut self, example: serde_json::Value) -> Self {
        self.request_example = Some(example);
        self
    }
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor::new(
                "upload_resume",
                "POST",
                "/resumes?filename={name}",
                "Upload a PDF, DOCX, or TXT resume as the raw request body. Returns the stored profile.",
            ),
            CommandDescriptor::new(
                "submit_resume_text",
                "POST",
                "/resumes/text",
                "Analyse pasted resume text and store the profile.",
            )
            .example(json!({
                "text": "Data analyst with 5 years of SQL...",
                "filename": "cv.txt"
            })),
            CommandDescriptor::new(
                "list_profiles",
                "GET",
                "/profiles?q={fragment}",
                "List stored profiles, optionally filtered by skill, role, or location.",
            ),
            CommandDescriptor::new(
                "latest_profile",
                "GET",
                "/profiles/latest",
                "Return the most recently created profile.",
            ),
            CommandDescriptor::new(
                "get_profile",
                "GET",
                "/profiles/{id}",
                "Return one profile with its analysis and structured details.",
            ),
            CommandDescriptor::new(
                "list_interviews",
                "GET",
                "/profiles/{id}/interviews",
                "List a profile's mock interviews, newest first.",
            ),
            CommandDescriptor::new(
                "rank_postings",
                "GET",
                "/profiles/{id}/postings?limit={n}",
                "Rank active recruiter postings for a profile.",
            ),
            CommandDescriptor::new(
                "match_jobs",
                "POST",
                "/matches",
                "Search the job board, index postings in Qdrant, and rank them against a profile.",
            )
            .example(json!({
                "job_seeker_id": "JS_1A2B3C4D",
                "keywords": "Data Analyst",
                "location": "Hong Kong",
                "mode": "standard",
                "top_k": 10,
                "min_salary": 30000
            })),
            CommandDescriptor::new(
                "list_matches",
                "GET",
                "/matches/{seeker_id}?min_score={score}&limit={n}",
                "Return stored matches with a combined score (0-100) of at least min_score, \
                 best first.",
            ),
            CommandDescriptor::new(
                "matched_seekers",
                "GET",
                "/matches",
                "List the profiles that have stored matches.",
            ),
            CommandDescriptor::new(
                "recent_matches",
                "GET",
                "/matches/{seeker_id}/recent?limit={n}",
                "Return a profile's most recently matched jobs.",
            ),
            CommandDescriptor::new(
                "match_statistics",
                "GET",
                "/matches/{seeker_id}/stats",
                "Aggregate similarity and match scores for a profile.",
            ),
            CommandDescriptor::new(
                "delete_match",
                "DELETE",
                "/matches/{seeker_id}/jobs/{job_id}",
                "Delete one stored match.",
            ),
            CommandDescriptor::new(
                "clear_matches",
                "DELETE",
                "/matches/{seeker_id}",
                "Delete every stored match of a profile.",
            ),
            CommandDescriptor::new(
                "create_posting",
                "POST",
                "/postings",
                "Store a recruiter posting.",
            )
            .example(json!({
                "job_title": "BI Analyst",
                "client_company": "Acme",
                "required_skills": "SQL, Tableau",
                "experience_level": "Mid-level",
                "work_location": "Hong Kong",
                "valid_until": "2026-12-31"
            })),
            CommandDescriptor::new(
                "list_postings",
                "GET",
                "/postings?active_only={bool}",
                "List recruiter postings, newest first.",
            ),
            CommandDescriptor::new(
                "rank_candidates",
                "GET",
                "/postings/{id}/candidates?limit={n}",
                "Rank stored candidates for a recruiter posting.",
            ),
            CommandDescriptor::new(
                "start_interview",
                "POST",
                "/interviews",
                "Start a mock interview for a matched job or a recruiter posting.",
            )
            .example(json!({ "job_seeker_id": "JS_1A2B3C4D", "job_id": "li-123" })),
            CommandDescriptor::new(
                "get_interview",
                "GET",
                "/interviews/{id}",
                "Return a mock interview transcript and its evaluations.",
            ),
            CommandDescriptor::new(
                "answer_interview",
                "POST",
                "/interviews/{id}/answers",
                "Answer the current question; returns the evaluation and the next question or summary.",
            )
            .example(json!({ "answer": "I rebuilt our reporting pipeline..." })),
            CommandDescriptor::new(
                "tailor_resume",
                "POST",
                "/tailor",
                "Rewrite a resume for one matched job.",
            )
            .example(json!({ "job_seeker_id": "JS_1A2B3C4D", "job_id": "li-123" })),
            CommandDescriptor::new(
                "market",
                "GET",
                "/market",
                "Posting distributions by industry and experience level.",
            ),
            CommandDescriptor::new(
                "usage",
                "GET",
                "/usage",
                "Token usage and estimated spend per model.",
            ),
            CommandDescriptor::new(
                "metrics",
                "GET",
                "/metrics",
                "Return platform counters useful for observability dashboards.",
            ),
            CommandDescriptor::new(
                "health",
                "GET",
                "/health",
                "Probe the database and Qdrant.",
            ),
        ],
    })
}

struct AppError(ServiceError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ServiceError::InvalidInput(_) | ServiceError::Resume(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            error if error.is_upstream() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        (status, self.0.to_string()).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(inner: ServiceError) -> Self {
        Self(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::{create_router, get_commands};
    use crate::config::SearchMode;
    use crate::interview::{AnswerOutcome, InterviewSession};
    use crate::llm::LlmError;
    use crate::matching::{CandidateAssessment, PostingScore};
    use crate::metrics::MetricsSnapshot;
    use crate::resume::{ResumeAnalysis, StructuredProfile};
    use crate::service::{
        CareerApi, HealthSnapshot, InterviewTarget, MatchOutcome, MatchRequest, ProfileSummary,
        ResumeOutcome, ServiceError, TailoredResumeOutcome,
    };
    use crate::store::{
        JobSeekerProfile, MarketOverview, MatchRecord, MatchStatistics, NewRecruiterPosting,
        RecruiterPosting,
    };
    use crate::usage::UsageSummary;
    use async_trait::async_trait;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    #[tokio::test]
    async fn commands_catalog_lists_every_route_family() {
        let response = get_commands().await;
        let commands = response.0.commands;
        let matches = commands
            .iter()
            .find(|cmd| cmd.name == "match_jobs")
            .expect("match command present");

        assert_eq!(matches.method, "POST");
        assert_eq!(matches.path, "/matches");
        assert!(matches.request_example.is_some());
        for prefix in ["/resumes", "/profiles", "/postings", "/interviews", "/tailor", "/health"] {
            assert!(
                commands.iter().any(|cmd| cmd.path.starts_with(prefix)),
                "missing {prefix}"
            );
        }
    }

    #[tokio::test]
    async fn resume_upload_passes_filename_and_bytes() {
        let service = Arc::new(StubCareerService::default());
        let app = create_router(service.clone());

        let (status, body) = send(
            app,
            Request::builder()
                .method(Method::POST)
                .uri("/resumes?filename=cv.pdf")
                .body(Body::from(vec![1_u8, 2, 3, 4]))
                .expect("request"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["profile"]["job_seeker_id"], "JS_STUB0001");
        assert_eq!(body["reused_existing"], false);
        assert_eq!(service.recorded_calls().await, vec!["resume cv.pdf 4"]);
    }

    #[tokio::test]
    async fn match_route_forwards_request_fields() {
        let service = Arc::new(StubCareerService::default());
        let app = create_router(service.clone());
        let payload = json!({
            "job_seeker_id": "JS_STUB0001",
            "location": "Hong Kong",
            "mode": "deep",
            "top_k": 5
        });

        let (status, body) = send(app, json_request(Method::POST, "/matches", &payload)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "deep");
        assert_eq!(body["location"], "Hong Kong");
        let requests = service.match_requests.lock().await.clone();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].mode, SearchMode::Deep);
        assert_eq!(requests[0].top_k, Some(5));
        assert_eq!(requests[0].keywords, None);
    }

    #[tokio::test]
    async fn match_route_rejects_blank_seekers() {
        let service = Arc::new(StubCareerService::default());
        let app = create_router(service.clone());
        let (status, _) = send(
            app,
            json_request(Method::POST, "/matches", &json!({ "job_seeker_id": " " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(service.match_requests.lock().await.is_empty());
    }

    #[tokio::test]
    async fn list_matches_reads_query_defaults() {
        let service = Arc::new(StubCareerService::default());
        let app = create_router(service.clone());

        let (status, body) = send(
            app.clone(),
            Request::builder()
                .uri("/matches/JS_STUB0001?min_score=55.5")
                .body(Body::empty())
                .expect("request"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["job_seeker_id"], "JS_STUB0001");
        assert_eq!(body["matches"], json!([]));
        assert_eq!(
            service.recorded_calls().await,
            vec!["matches JS_STUB0001 55.5 20"]
        );
    }

    #[tokio::test]
    async fn match_housekeeping_routes() {
        let service = Arc::new(StubCareerService::default());
        let app = create_router(service.clone());
        let get = |uri: &str| {
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request")
        };
        let delete = |uri: &str| {
            Request::builder()
                .method(Method::DELETE)
                .uri(uri)
                .body(Body::empty())
                .expect("request")
        };

        let (status, body) = send(app.clone(), get("/matches")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["job_seeker_ids"], json!(["JS_STUB0001"]));

        let (status, body) = send(app.clone(), get("/matches/JS_STUB0001/recent?limit=3")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matches"], json!([]));

        let (status, body) = send(app.clone(), delete("/matches/JS_STUB0001/jobs/li-1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], 1);
        let (status, _) = send(app.clone(), delete("/matches/JS_STUB0001/jobs/li-9")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(app.clone(), get("/profiles/latest")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["job_seeker_id"], "JS_STUB0001");

        let (status, body) = send(app, get("/profiles/JS_STUB0001/interviews")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["interviews"], json!([]));

        assert_eq!(
            service.recorded_calls().await,
            vec![
                "recent JS_STUB0001 3",
                "delete JS_STUB0001 li-1",
                "delete JS_STUB0001 li-9",
                "interviews JS_STUB0001",
            ]
        );
    }

    #[tokio::test]
    async fn errors_map_to_status_codes() {
        let service = Arc::new(StubCareerService::default());
        let app = create_router(service);

        let missing = Request::builder()
            .uri("/profiles/JS_MISSING")
            .body(Body::empty())
            .expect("request");
        assert_eq!(send(app.clone(), missing).await.0, StatusCode::NOT_FOUND);

        let upstream = json_request(
            Method::POST,
            "/interviews/session-1/answers",
            &json!({ "answer": "Because I like data." }),
        );
        assert_eq!(send(app.clone(), upstream).await.0, StatusCode::BAD_GATEWAY);

        let invalid = json_request(Method::POST, "/postings", &json!({ "job_title": "" }));
        assert_eq!(send(app, invalid).await.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unhealthy_dependencies_return_503() {
        let service = Arc::new(StubCareerService::default());
        let app = create_router(service);
        let (status, body) = send(
            app,
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["qdrant_reachable"], false);
    }

    fn json_request(method: Method, uri: &str, payload: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request")
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.expect("router response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    #[derive(Default)]
    struct StubCareerService {
        calls: Mutex<Vec<String>>,
        match_requests: Mutex<Vec<MatchRequest>>,
    }

    impl StubCareerService {
        async fn recorded_calls(&self) -> Vec<String> {
            self.calls.lock().await.clone()
        }

        fn profile() -> JobSeekerProfile {
            JobSeekerProfile {
                job_seeker_id: "JS_STUB0001".into(),
                created_at: "2026-01-01T00:00:00Z".into(),
                analysis: ResumeAnalysis::fallback(),
                details: StructuredProfile::default(),
                resume_filename: "cv.pdf".into(),
                resume_text: String::new(),
                resume_fingerprint: String::new(),
            }
        }
    }

    fn not_found(what: &str) -> ServiceError {
        ServiceError::NotFound(what.to_string())
    }

    #[async_trait]
    impl CareerApi for StubCareerService {
        async fn process_resume(
            &self,
            bytes: Vec<u8>,
            filename: &str,
        ) -> Result<ResumeOutcome, ServiceError> {
            self.calls
                .lock()
                .await
                .push(format!("resume {filename} {}", bytes.len()));
            Ok(ResumeOutcome {
                profile: Self::profile(),
                text_length: 120,
                word_count: 20,
                reused_existing: false,
            })
        }

        async fn process_resume_text(
            &self,
            _text: &str,
            _filename: &str,
        ) -> Result<ResumeOutcome, ServiceError> {
            Err(ServiceError::InvalidInput("stub".into()))
        }

        async fn get_profile(&self, job_seeker_id: &str) -> Result<JobSeekerProfile, ServiceError> {
            Err(not_found(job_seeker_id))
        }

        async fn list_profiles(
            &self,
            _query: Option<String>,
        ) -> Result<Vec<ProfileSummary>, ServiceError> {
            Ok(vec![ProfileSummary::from(&Self::profile())])
        }

        async fn latest_profile(&self) -> Result<JobSeekerProfile, ServiceError> {
            Ok(Self::profile())
        }

        async fn match_jobs(&self, request: MatchRequest) -> Result<MatchOutcome, ServiceError> {
            let outcome = MatchOutcome {
                job_seeker_id: request.job_seeker_id.clone(),
                search_id: "search-1".into(),
                keywords: "Professional".into(),
                location: request.location.clone().unwrap_or_default(),
                mode: request.mode,
                jobs_retrieved: 0,
                jobs_indexed: 0,
                matches_persisted: 0,
                salary_band: None,
                matches: Vec::new(),
            };
            self.match_requests.lock().await.push(request);
            Ok(outcome)
        }

        async fn list_matches(
            &self,
            job_seeker_id: &str,
            min_score: f64,
            limit: u32,
        ) -> Result<Vec<MatchRecord>, ServiceError> {
            self.calls
                .lock()
                .await
                .push(format!("matches {job_seeker_id} {min_score} {limit}"));
            Ok(Vec::new())
        }

        async fn match_statistics(
            &self,
            _job_seeker_id: &str,
        ) -> Result<MatchStatistics, ServiceError> {
            Ok(MatchStatistics::default())
        }

        async fn recent_matches(
            &self,
            job_seeker_id: &str,
            limit: u32,
        ) -> Result<Vec<MatchRecord>, ServiceError> {
            self.calls
                .lock()
                .await
                .push(format!("recent {job_seeker_id} {limit}"));
            Ok(Vec::new())
        }

        async fn matched_seekers(&self) -> Result<Vec<String>, ServiceError> {
            Ok(vec!["JS_STUB0001".into()])
        }

        async fn delete_match(
            &self,
            job_seeker_id: &str,
            job_id: &str,
        ) -> Result<(), ServiceError> {
            self.calls
                .lock()
                .await
                .push(format!("delete {job_seeker_id} {job_id}"));
            if job_id == "li-1" {
                Ok(())
            } else {
                Err(not_found(job_id))
            }
        }

        async fn clear_matches(&self, _job_seeker_id: &str) -> Result<u64, ServiceError> {
            Ok(0)
        }

        async fn create_posting(
            &self,
            posting: NewRecruiterPosting,
        ) -> Result<RecruiterPosting, ServiceError> {
            if posting.job_title.trim().is_empty() {
                return Err(ServiceError::InvalidInput("job_title is required".into()));
            }
            Ok(RecruiterPosting {
                id: 1,
                created_at: String::new(),
                posting,
            })
        }

        async fn list_postings(
            &self,
            _active_only: bool,
        ) -> Result<Vec<RecruiterPosting>, ServiceError> {
            Ok(Vec::new())
        }

        async fn rank_candidates(
            &self,
            posting_id: i64,
            _limit: usize,
        ) -> Result<Vec<CandidateAssessment>, ServiceError> {
            Err(not_found(&posting_id.to_string()))
        }

        async fn rank_postings_for_seeker(
            &self,
            _job_seeker_id: &str,
            _limit: usize,
        ) -> Result<Vec<PostingScore>, ServiceError> {
            Ok(Vec::new())
        }

        async fn start_interview(
            &self,
            target: InterviewTarget,
        ) -> Result<InterviewSession, ServiceError> {
            Err(not_found(&target.job_seeker_id))
        }

        async fn answer_interview(
            &self,
            _session_id: &str,
            _answer: &str,
        ) -> Result<AnswerOutcome, ServiceError> {
            Err(ServiceError::Llm(LlmError::EmptyContent))
        }

        async fn get_interview(&self, session_id: &str) -> Result<InterviewSession, ServiceError> {
            Err(not_found(session_id))
        }

        async fn list_interviews(
            &self,
            job_seeker_id: &str,
        ) -> Result<Vec<InterviewSession>, ServiceError> {
            self.calls
                .lock()
                .await
                .push(format!("interviews {job_seeker_id}"));
            Ok(Vec::new())
        }

        async fn tailor_resume(
            &self,
            _job_seeker_id: &str,
            job_id: &str,
        ) -> Result<TailoredResumeOutcome, ServiceError> {
            Err(not_found(job_id))
        }

        async fn market_overview(&self) -> Result<MarketOverview, ServiceError> {
            Ok(MarketOverview::default())
        }

        fn usage_summary(&self) -> UsageSummary {
            UsageSummary::default()
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot::default()
        }

        async fn health(&self) -> HealthSnapshot {
            HealthSnapshot {
                database_ok: true,
                qdrant_reachable: false,
                collection_present: false,
                errors: vec!["qdrant: connection refused".into()],
            }
        }
    }
}
