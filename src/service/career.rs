//! Career service coordinating resume analysis, job matching, interviews, and tailoring.

use super::types::{
    HealthSnapshot, InterviewTarget, MatchOutcome, MatchRequest, ProfileSummary, ResumeOutcome,
    ServiceError, ServiceSettings, TailoredResumeOutcome,
};
use crate::{
    config::get_config,
    embedding::{EmbeddingClient, EmbeddingClientError, get_embedding_client},
    interview::{self, AnswerOutcome, InterviewJob, InterviewSession},
    jobs::{JobBoard, JobPosting, RapidApiJobBoard, dedupe_jobs, filter_by_salary, salary_band},
    llm::{ChatCompletionClient, CompletionClient},
    matching::{
        self, CandidateAssessment, PostingScore, ScoredJob, assess_candidate, rule_based_score,
    },
    metrics::{MetricsSnapshot, PlatformMetrics},
    qdrant::{JobPoint, QdrantService, job_payload, point_id_for_job},
    resume::{
        ParsedResume, StructuredProfile, analyze_resume, extract_profile, parse_resume,
        parse_resume_text,
    },
    store::{
        JobSeekerProfile, MarketOverview, MatchRecord, MatchStatistics, NewRecruiterPosting,
        RecruiterPosting, Store,
    },
    tailoring,
    usage::{TokenUsageTracker, UsageSummary},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

const DEFAULT_TOP_K: usize = 20;
const MAX_TOP_K: usize = 50;

/// Long-lived handles the service is assembled from.
pub struct ServiceParts {
    /// Tunables.
    pub settings: ServiceSettings,
    /// Database handle.
    pub store: Store,
    /// Chat-completion backend.
    pub llm: Box<dyn CompletionClient>,
    /// Embedding backend.
    pub embedding_client: Box<dyn EmbeddingClient + Send + Sync>,
    /// Vector store client.
    pub qdrant: QdrantService,
    /// Job-board backend.
    pub job_board: Box<dyn JobBoard + Send + Sync>,
    /// Token usage shared with the vendor clients.
    pub usage: Arc<TokenUsageTracker>,
}

/// Coordinates the full career pipeline on top of SQLite, the LLM, embeddings, Qdrant, and the
/// job board.
///
/// Construct it once near process start and share it through an `Arc`; both the HTTP surface
/// and the MCP tools drive the same instance.
pub struct CareerService {
    settings: ServiceSettings,
    store: Store,
    llm: Box<dyn CompletionClient>,
    embedding_client: Box<dyn EmbeddingClient + Send + Sync>,
    qdrant: QdrantService,
    job_board: Box<dyn JobBoard + Send + Sync>,
    usage: Arc<TokenUsageTracker>,
    metrics: Arc<PlatformMetrics>,
    interview_lock: Mutex<()>,
}

/// Abstraction over the career pipeline used by external surfaces (HTTP, MCP).
#[async_trait]
pub trait CareerApi: Send + Sync {
    /// Parse an uploaded resume file, analyse it, and store the profile.
    async fn process_resume(
        &self,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<ResumeOutcome, ServiceError>;

    /// Same as [`CareerApi::process_resume`] for pasted text.
    async fn process_resume_text(
        &self,
        text: &str,
        filename: &str,
    ) -> Result<ResumeOutcome, ServiceError>;

    /// Fetch one profile.
    async fn get_profile(&self, job_seeker_id: &str) -> Result<JobSeekerProfile, ServiceError>;

    /// List profiles, optionally filtered by a skill, role, or location fragment.
    async fn list_profiles(
        &self,
        query: Option<String>,
    ) -> Result<Vec<ProfileSummary>, ServiceError>;

    /// Most recently created profile.
    async fn latest_profile(&self) -> Result<JobSeekerProfile, ServiceError>;

    /// Search the job board, index the postings, and rank them against a profile.
    async fn match_jobs(&self, request: MatchRequest) -> Result<MatchOutcome, ServiceError>;

    /// Stored matches for a profile with a combined score of at least `min_score` (0..=100).
    async fn list_matches(
        &self,
        job_seeker_id: &str,
        min_score: f64,
        limit: u32,
    ) -> Result<Vec<MatchRecord>, ServiceError>;

    /// Aggregate match scores for a profile.
    async fn match_statistics(
        &self,
        job_seeker_id: &str,
    ) -> Result<MatchStatistics, ServiceError>;

    /// A profile's most recently matched jobs.
    async fn recent_matches(
        &self,
        job_seeker_id: &str,
        limit: u32,
    ) -> Result<Vec<MatchRecord>, ServiceError>;

    /// Profiles with at least one stored match.
    async fn matched_seekers(&self) -> Result<Vec<String>, ServiceError>;

    /// Delete one stored match.
    async fn delete_match(&self, job_seeker_id: &str, job_id: &str) -> Result<(), ServiceError>;

    /// Delete every stored match of a profile.
    async fn clear_matches(&self, job_seeker_id: &str) -> Result<u64, ServiceError>;

    /// Store a recruiter posting.
    async fn create_posting(
        &self,
        posting: NewRecruiterPosting,
    ) -> Result<RecruiterPosting, ServiceError>;

    /// List recruiter postings.
    async fn list_postings(
        &self,
        active_only: bool,
    ) -> Result<Vec<RecruiterPosting>, ServiceError>;

    /// Rank stored candidates for a recruiter posting.
    async fn rank_candidates(
        &self,
        posting_id: i64,
        limit: usize,
    ) -> Result<Vec<CandidateAssessment>, ServiceError>;

    /// Rank active recruiter postings for a profile.
    async fn rank_postings_for_seeker(
        &self,
        job_seeker_id: &str,
        limit: usize,
    ) -> Result<Vec<PostingScore>, ServiceError>;

    /// Start a mock interview.
    async fn start_interview(
        &self,
        target: InterviewTarget,
    ) -> Result<InterviewSession, ServiceError>;

    /// Answer the current question of a mock interview.
    async fn answer_interview(
        &self,
        session_id: &str,
        answer: &str,
    ) -> Result<AnswerOutcome, ServiceError>;

    /// Fetch a mock interview.
    async fn get_interview(&self, session_id: &str) -> Result<InterviewSession, ServiceError>;

    /// Every mock interview of a profile, newest first.
    async fn list_interviews(
        &self,
        job_seeker_id: &str,
    ) -> Result<Vec<InterviewSession>, ServiceError>;

    /// Tailor a profile's resume to one of its matched jobs.
    async fn tailor_resume(
        &self,
        job_seeker_id: &str,
        job_id: &str,
    ) -> Result<TailoredResumeOutcome, ServiceError>;

    /// Market distributions over recruiter postings.
    async fn market_overview(&self) -> Result<MarketOverview, ServiceError>;

    /// Token usage and estimated spend.
    fn usage_summary(&self) -> UsageSummary;

    /// Platform counters.
    fn metrics_snapshot(&self) -> MetricsSnapshot;

    /// Probe the database and vector store.
    async fn health(&self) -> HealthSnapshot;
}

impl CareerService {
    /// Build the service from the global configuration, preparing storage and the job collection.
    pub async fn new() -> Result<Self, ServiceError> {
        let config = get_config();
        let usage = Arc::new(TokenUsageTracker::new());

        tracing::info!(path = %config.database_path.display(), "Opening database");
        let store = Store::from_config(config).await?;
        let llm = ChatCompletionClient::from_config(config, usage.clone())?;
        tracing::info!("Initializing embedding client");
        let embedding_client = get_embedding_client(usage.clone())?;
        let qdrant = QdrantService::from_config(config)?;
        let job_board = RapidApiJobBoard::from_config(config)?;

        let service = Self::from_parts(ServiceParts {
            settings: ServiceSettings::from_config(config),
            store,
            llm: Box::new(llm),
            embedding_client,
            qdrant,
            job_board: Box::new(job_board),
            usage,
        });
        service.ensure_collection().await?;
        Ok(service)
    }

    /// Assemble the service from explicit parts.
    pub fn from_parts(parts: ServiceParts) -> Self {
        Self {
            settings: parts.settings,
            store: parts.store,
            llm: parts.llm,
            embedding_client: parts.embedding_client,
            qdrant: parts.qdrant,
            job_board: parts.job_board,
            usage: parts.usage,
            metrics: Arc::new(PlatformMetrics::new()),
            interview_lock: Mutex::new(()),
        }
    }

    /// Database handle, for operator tooling.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Job-board backend, for connectivity probes.
    pub fn job_board(&self) -> &(dyn JobBoard + Send + Sync) {
        self.job_board.as_ref()
    }

    /// Ensure the job collection and its payload indexes exist.
    pub async fn ensure_collection(&self) -> Result<(), ServiceError> {
        let collection = &self.settings.collection;
        let vector_size = self.embedding_client.dimension() as u64;
        tracing::debug!(collection = %collection, vector_size, "Ensuring job collection");
        self.qdrant
            .ensure_job_collection(collection, vector_size)
            .await?;
        Ok(())
    }

    async fn store_resume(&self, parsed: ParsedResume) -> Result<ResumeOutcome, ServiceError> {
        if let Some(existing) = self
            .store
            .profile_by_fingerprint(&parsed.fingerprint)
            .await?
        {
            tracing::info!(
                job_seeker_id = %existing.job_seeker_id,
                filename = %parsed.filename,
                "Resume already processed; reusing profile"
            );
            return Ok(ResumeOutcome {
                profile: existing,
                text_length: parsed.text_length,
                word_count: parsed.word_count,
                reused_existing: true,
            });
        }

        let analysis = analyze_resume(self.llm.as_ref(), &parsed.raw_text).await;
        let seeded = StructuredProfile::from_analysis(&analysis);
        let details = if self.settings.enable_profile_pass2 {
            let mut extracted = extract_profile(self.llm.as_ref(), &parsed.raw_text).await;
            extracted.merge_missing(seeded);
            extracted
        } else {
            seeded
        };

        let mut profile = JobSeekerProfile::new(&parsed, analysis, details);
        self.store.create_profile(&mut profile).await?;
        self.metrics.record_resume();
        tracing::info!(
            job_seeker_id = %profile.job_seeker_id,
            role = %profile.analysis.primary_role,
            words = parsed.word_count,
            "Resume processed"
        );
        Ok(ResumeOutcome {
            profile,
            text_length: parsed.text_length,
            word_count: parsed.word_count,
            reused_existing: false,
        })
    }

    async fn require_profile(&self, job_seeker_id: &str) -> Result<JobSeekerProfile, ServiceError> {
        self.store
            .get_profile(job_seeker_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("job seeker {job_seeker_id}")))
    }

    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, ServiceError> {
        let expected = texts.len();
        let vectors = self.embedding_client.generate_embeddings(texts).await?;
        if vectors.len() != expected {
            return Err(EmbeddingClientError::GenerationFailed(format!(
                "expected {expected} vectors, got {}",
                vectors.len()
            ))
            .into());
        }
        let dimension = self.embedding_client.dimension();
        if let Some(bad) = vectors.iter().find(|vector| vector.len() != dimension) {
            return Err(EmbeddingClientError::DimensionMismatch {
                expected: dimension,
                actual: bad.len(),
            }
            .into());
        }
        Ok(vectors)
    }

    /// Embed `jobs` and write them to the collection under `search_id`.
    async fn index_jobs(
        &self,
        jobs: &[JobPosting],
        search_id: &str,
    ) -> Result<usize, ServiceError> {
        if jobs.is_empty() {
            return Ok(0);
        }
        let texts = jobs.iter().map(matching::job_text).collect();
        let vectors = self.embed(texts).await?;
        let points: Vec<JobPoint> = jobs
            .iter()
            .zip(vectors)
            .map(|(job, vector)| JobPoint {
                id: point_id_for_job(search_id, &job.id),
                vector,
                payload: job_payload(job, search_id),
            })
            .collect();
        Ok(self
            .qdrant
            .upsert_jobs(&self.settings.collection, points)
            .await?)
    }

    /// Embed the profile and score the nearest postings indexed under `search_id`.
    async fn rank_indexed(
        &self,
        profile: &JobSeekerProfile,
        indexed: &[JobPosting],
        search_id: &str,
    ) -> Result<Vec<ScoredJob>, ServiceError> {
        let skills = profile.skills();
        let query = matching::query_text(
            &profile.analysis.primary_role,
            &skills,
            &profile.resume_text,
        );
        let vector = self
            .embed(vec![query])
            .await?
            .pop()
            .ok_or_else(|| EmbeddingClientError::GenerationFailed("no query vector".into()))?;

        let hits = self
            .qdrant
            .query_search_run(
                &self.settings.collection,
                vector,
                search_id,
                matching::vector_query_limit(indexed.len()),
            )
            .await?;

        let by_id: HashMap<&str, &JobPosting> =
            indexed.iter().map(|job| (job.id.as_str(), job)).collect();
        let candidate_skills = matching::candidate_skills(&skills);
        let scored = hits
            .into_iter()
            .filter_map(|hit| {
                let job = by_id.get(hit.job_id.as_str())?;
                Some(matching::score_job((*job).clone(), hit.score, &candidate_skills))
            })
            .collect();
        Ok(matching::rank_jobs(scored))
    }

    async fn require_session(&self, session_id: &str) -> Result<InterviewSession, ServiceError> {
        self.store
            .get_session(session_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("interview session {session_id}")))
    }

    /// Process a resume file.
    pub async fn process_resume(
        &self,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<ResumeOutcome, ServiceError> {
        let parsed = parse_resume(&bytes, filename)?;
        self.store_resume(parsed).await
    }

    /// Process pasted resume text.
    pub async fn process_resume_text(
        &self,
        text: &str,
        filename: &str,
    ) -> Result<ResumeOutcome, ServiceError> {
        let parsed = parse_resume_text(text, filename)?;
        self.store_resume(parsed).await
    }

    /// Run a full search, index, and match cycle for a profile.
    ///
    /// Job-board failures are logged and treated as an empty result; embedding, vector-store,
    /// and database failures propagate.
    pub async fn match_jobs(&self, request: MatchRequest) -> Result<MatchOutcome, ServiceError> {
        let profile = self.require_profile(&request.job_seeker_id).await?;
        let keywords = request
            .keywords
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(profile.analysis.primary_role.as_str())
            .to_string();
        let location = request
            .location
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(self.settings.default_location.as_str())
            .to_string();
        let top_k = request.top_k.unwrap_or(DEFAULT_TOP_K).clamp(1, MAX_TOP_K);
        let search_id = Uuid::new_v4().to_string();

        tracing::info!(
            job_seeker_id = %profile.job_seeker_id,
            keywords = %keywords,
            location = %location,
            mode = request.mode.label(),
            search_id = %search_id,
            "Starting job match"
        );

        let jobs = match crate::jobs::search_with_fallback(
            self.job_board.as_ref(),
            &keywords,
            &location,
            request.mode.job_count(),
        )
        .await
        {
            Ok(jobs) => jobs,
            Err(error) => {
                tracing::warn!(error = %error, "Job search failed; continuing without postings");
                Vec::new()
            }
        };
        let mut jobs = dedupe_jobs(jobs);
        if let Some(minimum) = request.min_salary {
            jobs = filter_by_salary(jobs, minimum);
        }
        let band = salary_band(&jobs);

        let index_limit =
            matching::determine_index_limit(jobs.len(), top_k, self.settings.max_jobs_to_index);
        let to_index = &jobs[..index_limit];
        let indexed = self.index_jobs(to_index, &search_id).await?;

        let mut ranked = if indexed == 0 {
            Vec::new()
        } else {
            self.rank_indexed(&profile, to_index, &search_id).await?
        };
        ranked.truncate(top_k);

        let records: Vec<MatchRecord> = ranked
            .iter()
            .map(|scored| MatchRecord::from_scored(&profile.job_seeker_id, scored))
            .collect();
        let persisted = self.store.save_matches(&records).await;
        self.metrics
            .record_search(jobs.len() as u64, indexed as u64, persisted as u64);

        tracing::info!(
            search_id = %search_id,
            retrieved = jobs.len(),
            indexed,
            matches = ranked.len(),
            persisted,
            "Job match completed"
        );

        Ok(MatchOutcome {
            job_seeker_id: profile.job_seeker_id,
            search_id,
            keywords,
            location,
            mode: request.mode,
            jobs_retrieved: jobs.len(),
            jobs_indexed: indexed,
            matches_persisted: persisted,
            salary_band: band,
            matches: ranked,
        })
    }

    /// Rank stored candidates for a recruiter posting, best first.
    pub async fn rank_candidates(
        &self,
        posting_id: i64,
        limit: usize,
    ) -> Result<Vec<CandidateAssessment>, ServiceError> {
        let posting = self
            .store
            .get_posting(posting_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("posting {posting_id}")))?;
        let mut ranked: Vec<CandidateAssessment> = self
            .store
            .list_profiles()
            .await?
            .iter()
            .map(|profile| assess_candidate(&posting, profile))
            .collect();
        ranked.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Rank active recruiter postings for a profile, best first.
    pub async fn rank_postings_for_seeker(
        &self,
        job_seeker_id: &str,
        limit: usize,
    ) -> Result<Vec<PostingScore>, ServiceError> {
        let profile = self.require_profile(job_seeker_id).await?;
        let mut ranked: Vec<PostingScore> = self
            .store
            .list_postings(true)
            .await?
            .iter()
            .map(|posting| rule_based_score(&profile, posting))
            .collect();
        ranked.sort_by(|a, b| b.overall_score.cmp(&a.overall_score));
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Start a mock interview for a match or a recruiter posting.
    pub async fn start_interview(
        &self,
        target: InterviewTarget,
    ) -> Result<InterviewSession, ServiceError> {
        let profile = self.require_profile(&target.job_seeker_id).await?;
        let job = match (&target.job_id, target.posting_id) {
            (Some(job_id), _) => {
                let record = self
                    .store
                    .get_match(&profile.job_seeker_id, job_id)
                    .await?
                    .ok_or_else(|| ServiceError::NotFound(format!("matched job {job_id}")))?;
                InterviewJob::from_match(&record)
            }
            (None, Some(posting_id)) => {
                let posting = self
                    .store
                    .get_posting(posting_id)
                    .await?
                    .ok_or_else(|| ServiceError::NotFound(format!("posting {posting_id}")))?;
                InterviewJob::from_posting(&posting)
            }
            (None, None) => {
                return Err(ServiceError::InvalidInput(
                    "either job_id or posting_id is required".into(),
                ));
            }
        };

        let session = interview::start_interview(
            self.llm.as_ref(),
            &profile.job_seeker_id,
            job,
            &profile.details,
            self.settings.interview_questions,
        )
        .await?;
        self.store.save_session(&session).await?;
        self.metrics.record_interview_started();
        Ok(session)
    }

    /// Answer the current question of a stored interview.
    pub async fn answer_interview(
        &self,
        session_id: &str,
        answer: &str,
    ) -> Result<AnswerOutcome, ServiceError> {
        let _guard = self.interview_lock.lock().await;
        let mut session = self.require_session(session_id).await?;
        let candidate = self
            .store
            .get_profile(&session.job_seeker_id)
            .await?
            .map(|profile| profile.details)
            .unwrap_or_default();

        let outcome =
            interview::submit_answer(self.llm.as_ref(), &mut session, &candidate, answer).await?;
        self.store.save_session(&session).await?;
        if outcome.completed {
            self.metrics.record_interview_completed();
        }
        Ok(outcome)
    }

    /// Tailor a profile's resume to one of its matched jobs.
    ///
    /// Runs structured extraction first when resume processing skipped it, and stores the result.
    pub async fn tailor_resume(
        &self,
        job_seeker_id: &str,
        job_id: &str,
    ) -> Result<TailoredResumeOutcome, ServiceError> {
        let mut profile = self.require_profile(job_seeker_id).await?;
        let record = self
            .store
            .get_match(job_seeker_id, job_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("matched job {job_id}")))?;

        if profile.details.needs_extraction() {
            let mut extracted = extract_profile(self.llm.as_ref(), &profile.resume_text).await;
            if !extracted.needs_extraction() {
                extracted.merge_missing(profile.details.clone());
                self.store
                    .update_profile_details(job_seeker_id, &extracted)
                    .await?;
                profile.details = extracted;
            }
        }

        let resume = tailoring::generate(self.llm.as_ref(), &profile, &record).await?;
        self.metrics.record_tailored_resume();
        Ok(TailoredResumeOutcome {
            job_seeker_id: job_seeker_id.to_string(),
            job_id: job_id.to_string(),
            job_title: record.job_title,
            text: tailoring::render_text(&resume),
            resume,
        })
    }

    /// Probe the database and the vector store.
    pub async fn health(&self) -> HealthSnapshot {
        let mut errors = Vec::new();
        let database_ok = match self.store.ping().await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(error = %error, "Database health probe failed");
                errors.push(format!("database: {error}"));
                false
            }
        };
        let (qdrant_reachable, collection_present) = match self.qdrant.collection_names().await {
            Ok(collections) => (
                true,
                collections
                    .iter()
                    .any(|name| name == &self.settings.collection),
            ),
            Err(error) => {
                tracing::warn!(error = %error, "Qdrant health probe failed");
                errors.push(format!("qdrant: {error}"));
                (false, false)
            }
        };
        HealthSnapshot {
            database_ok,
            qdrant_reachable,
            collection_present,
            errors,
        }
    }
}

#[async_trait]
impl CareerApi for CareerService {
    async fn process_resume(
        &self,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<ResumeOutcome, ServiceError> {
        CareerService::process_resume(self, bytes, filename).await
    }

    async fn process_resume_text(
        &self,
        text: &str,
        filename: &str,
    ) -> Result<ResumeOutcome, ServiceError> {
        CareerService::process_resume_text(self, text, filename).await
    }

    async fn get_profile(&self, job_seeker_id: &str) -> Result<JobSeekerProfile, ServiceError> {
        self.require_profile(job_seeker_id).await
    }

    async fn list_profiles(
        &self,
        query: Option<String>,
    ) -> Result<Vec<ProfileSummary>, ServiceError> {
        let profiles = match query.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => self.store.search_profiles(query).await?,
            _ => self.store.list_profiles().await?,
        };
        Ok(profiles.iter().map(ProfileSummary::from).collect())
    }

    async fn latest_profile(&self) -> Result<JobSeekerProfile, ServiceError> {
        self.store
            .latest_profile()
            .await?
            .ok_or_else(|| ServiceError::NotFound("no job seeker profiles yet".into()))
    }

    async fn match_jobs(&self, request: MatchRequest) -> Result<MatchOutcome, ServiceError> {
        CareerService::match_jobs(self, request).await
    }

    async fn list_matches(
        &self,
        job_seeker_id: &str,
        min_score: f64,
        limit: u32,
    ) -> Result<Vec<MatchRecord>, ServiceError> {
        let min_score = if min_score.is_finite() {
            min_score.clamp(0.0, 100.0)
        } else {
            0.0
        };
        Ok(self
            .store
            .list_matches(job_seeker_id, min_score, limit)
            .await?)
    }

    async fn match_statistics(
        &self,
        job_seeker_id: &str,
    ) -> Result<MatchStatistics, ServiceError> {
        Ok(self.store.match_statistics(job_seeker_id).await?)
    }

    async fn recent_matches(
        &self,
        job_seeker_id: &str,
        limit: u32,
    ) -> Result<Vec<MatchRecord>, ServiceError> {
        Ok(self.store.recent_matches(job_seeker_id, limit).await?)
    }

    async fn matched_seekers(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.store.matched_seekers().await?)
    }

    async fn delete_match(&self, job_seeker_id: &str, job_id: &str) -> Result<(), ServiceError> {
        if !self.store.delete_match(job_seeker_id, job_id).await? {
            return Err(ServiceError::NotFound(format!(
                "match {job_id} for job seeker {job_seeker_id}"
            )));
        }
        tracing::info!(job_seeker_id, job_id, "Deleted match");
        Ok(())
    }

    async fn clear_matches(&self, job_seeker_id: &str) -> Result<u64, ServiceError> {
        let removed = self.store.delete_matches_for_seeker(job_seeker_id).await?;
        tracing::info!(job_seeker_id, removed, "Cleared matches");
        Ok(removed)
    }

    async fn create_posting(
        &self,
        posting: NewRecruiterPosting,
    ) -> Result<RecruiterPosting, ServiceError> {
        if posting.job_title.trim().is_empty() {
            return Err(ServiceError::InvalidInput("job_title is required".into()));
        }
        Ok(self.store.save_posting(&posting).await?)
    }

    async fn list_postings(
        &self,
        active_only: bool,
    ) -> Result<Vec<RecruiterPosting>, ServiceError> {
        Ok(self.store.list_postings(active_only).await?)
    }

    async fn rank_candidates(
        &self,
        posting_id: i64,
        limit: usize,
    ) -> Result<Vec<CandidateAssessment>, ServiceError> {
        CareerService::rank_candidates(self, posting_id, limit).await
    }

    async fn rank_postings_for_seeker(
        &self,
        job_seeker_id: &str,
        limit: usize,
    ) -> Result<Vec<PostingScore>, ServiceError> {
        CareerService::rank_postings_for_seeker(self, job_seeker_id, limit).await
    }

    async fn start_interview(
        &self,
        target: InterviewTarget,
    ) -> Result<InterviewSession, ServiceError> {
        CareerService::start_interview(self, target).await
    }

    async fn answer_interview(
        &self,
        session_id: &str,
        answer: &str,
    ) -> Result<AnswerOutcome, ServiceError> {
        CareerService::answer_interview(self, session_id, answer).await
    }

    async fn get_interview(&self, session_id: &str) -> Result<InterviewSession, ServiceError> {
        self.require_session(session_id).await
    }

    async fn list_interviews(
        &self,
        job_seeker_id: &str,
    ) -> Result<Vec<InterviewSession>, ServiceError> {
        self.require_profile(job_seeker_id).await?;
        Ok(self.store.list_sessions(job_seeker_id).await?)
    }

    async fn tailor_resume(
        &self,
        job_seeker_id: &str,
        job_id: &str,
    ) -> Result<TailoredResumeOutcome, ServiceError> {
        CareerService::tailor_resume(self, job_seeker_id, job_id).await
    }

    async fn market_overview(&self) -> Result<MarketOverview, ServiceError> {
        Ok(self.store.market_overview().await?)
    }

    fn usage_summary(&self) -> UsageSummary {
        self.usage.summary()
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    async fn health(&self) -> HealthSnapshot {
        CareerService::health(self).await
    }
}
