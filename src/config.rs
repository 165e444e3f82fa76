use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

/// Upper bound on `LLM_MAX_RETRIES`.
pub const MAX_LLM_RETRIES: u32 = 10;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the CareerLens services.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Location of the SQLite database file.
    pub database_path: PathBuf,
    /// Chat-completion API flavour.
    pub llm_provider: LlmProvider,
    /// Base URL of the chat-completion endpoint.
    pub llm_endpoint: String,
    /// Optional API key for the chat-completion endpoint.
    pub llm_api_key: Option<String>,
    /// Deployment (Azure) or model (OpenAI) used for completions.
    pub llm_deployment: String,
    /// Azure API version appended to every request.
    pub llm_api_version: String,
    /// Client-side request budget per minute for completions.
    pub llm_max_requests_per_minute: usize,
    /// Retries applied to throttled or failed completion calls, at most ten.
    pub llm_max_retries: u32,
    /// Embedding provider used to vectorise resumes and postings.
    pub embedding_provider: EmbeddingProvider,
    /// Embedding model or deployment identifier.
    pub embedding_model: String,
    /// Dimensionality of the produced vectors.
    pub embedding_dimension: usize,
    /// Base URL of the embedding endpoint.
    pub embedding_endpoint: String,
    /// Optional API key for the embedding endpoint.
    pub embedding_api_key: Option<String>,
    /// Number of texts sent per embedding request.
    pub embedding_batch_size: usize,
    /// Pause between consecutive embedding batches.
    pub embedding_batch_delay: Duration,
    /// Base URL of the Qdrant instance that stores job vectors.
    pub qdrant_url: String,
    /// Collection holding indexed job postings.
    pub qdrant_collection_name: String,
    /// Optional API key required to access Qdrant.
    pub qdrant_api_key: Option<String>,
    /// Base URL of the job board API.
    pub job_board_url: String,
    /// RapidAPI key used for job board requests.
    pub job_board_api_key: Option<String>,
    /// Request budget per minute for the job board.
    pub job_board_max_requests_per_minute: usize,
    /// Upper bound on postings embedded per search.
    pub max_jobs_to_index: usize,
    /// Location used when a search does not specify one.
    pub default_location: String,
    /// Number of questions asked in a mock interview.
    pub interview_questions: usize,
    /// Run structured profile extraction while processing resumes.
    pub enable_profile_pass2: bool,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Supported chat-completion API flavours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Azure OpenAI deployments.
    Azure,
    /// OpenAI-compatible `/v1` endpoints.
    OpenAI,
}

/// Supported embedding backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Azure OpenAI embedding deployments.
    Azure,
    /// OpenAI-compatible `/v1/embeddings` endpoints.
    OpenAI,
    /// Deterministic offline hashing, useful for tests and demos.
    Hash,
}

/// Job search depth presets exposed to users.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Small, fast search.
    #[default]
    Quick,
    /// Balanced search.
    Standard,
    /// Broad search that takes noticeably longer.
    Deep,
}

impl SearchMode {
    /// All modes in presentation order.
    pub const ALL: [SearchMode; 3] = [SearchMode::Quick, SearchMode::Standard, SearchMode::Deep];

    /// Number of postings requested from the job board.
    pub fn job_count(self) -> usize {
        match self {
            SearchMode::Quick => 15,
            SearchMode::Standard => 25,
            SearchMode::Deep => 40,
        }
    }

    /// Rough wall-clock estimate shown to users.
    pub fn estimated_seconds(self) -> u64 {
        match self {
            SearchMode::Quick => 30,
            SearchMode::Standard => 60,
            SearchMode::Deep => 120,
        }
    }

    /// Lowercase label used on the wire.
    pub fn label(self) -> &'static str {
        match self {
            SearchMode::Quick => "quick",
            SearchMode::Standard => "standard",
            SearchMode::Deep => "deep",
        }
    }
}

impl std::str::FromStr for SearchMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quick" => Ok(Self::Quick),
            "standard" => Ok(Self::Standard),
            "deep" => Ok(Self::Deep),
            _ => Err(()),
        }
    }
}

const DEFAULT_DATABASE_PATH: &str = "data/careerlens.db";
const DEFAULT_LLM_DEPLOYMENT: &str = "gpt-4o-mini";
const DEFAULT_LLM_API_VERSION: &str = "2024-10-21";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_EMBEDDING_DIMENSION: usize = 1536;
const DEFAULT_COLLECTION: &str = "careerlens-jobs";
const DEFAULT_JOB_BOARD_URL: &str = "https://linkedin-job-search-api.p.rapidapi.com";
const DEFAULT_LOCATION: &str = "United States";

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let llm_endpoint = load_env("LLM_ENDPOINT")?;
        let llm_api_key = load_env_optional("LLM_API_KEY");

        Ok(Self {
            database_path: load_env_optional("CAREERLENS_DB_PATH")
                .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string())
                .into(),
            llm_provider: match load_env_optional("LLM_PROVIDER") {
                Some(value) => value
                    .parse()
                    .map_err(|()| ConfigError::InvalidValue("LLM_PROVIDER".into()))?,
                None => LlmProvider::Azure,
            },
            llm_deployment: load_env_optional("LLM_DEPLOYMENT")
                .unwrap_or_else(|| DEFAULT_LLM_DEPLOYMENT.to_string()),
            llm_api_version: load_env_optional("LLM_API_VERSION")
                .unwrap_or_else(|| DEFAULT_LLM_API_VERSION.to_string()),
            llm_max_requests_per_minute: load_usize_with_minimum(
                "LLM_MAX_REQUESTS_PER_MINUTE",
                60,
                1,
            ),
            llm_max_retries: coerce_retries(load_env_optional("LLM_MAX_RETRIES").as_deref()),
            embedding_provider: match load_env_optional("EMBEDDING_PROVIDER") {
                Some(value) => value
                    .parse()
                    .map_err(|()| ConfigError::InvalidValue("EMBEDDING_PROVIDER".into()))?,
                None => EmbeddingProvider::Azure,
            },
            embedding_model: load_env_optional("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            embedding_dimension: match load_env_optional("EMBEDDING_DIMENSION") {
                Some(value) => value
                    .parse()
                    .ok()
                    .filter(|dimension: &usize| *dimension > 0)
                    .ok_or_else(|| ConfigError::InvalidValue("EMBEDDING_DIMENSION".into()))?,
                None => DEFAULT_EMBEDDING_DIMENSION,
            },
            embedding_endpoint: load_env_optional("EMBEDDING_ENDPOINT")
                .unwrap_or_else(|| llm_endpoint.clone()),
            embedding_api_key: load_env_optional("EMBEDDING_API_KEY").or(llm_api_key.clone()),
            embedding_batch_size: load_usize_with_minimum("EMBEDDING_BATCH_SIZE", 20, 5),
            embedding_batch_delay: load_seconds("EMBEDDING_BATCH_DELAY", 0.2),
            qdrant_url: load_env("QDRANT_URL")?,
            qdrant_collection_name: load_env_optional("QDRANT_COLLECTION_NAME")
                .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            qdrant_api_key: load_env_optional("QDRANT_API_KEY"),
            job_board_url: load_env_optional("JOB_BOARD_URL")
                .unwrap_or_else(|| DEFAULT_JOB_BOARD_URL.to_string()),
            job_board_api_key: load_env_optional("RAPIDAPI_KEY"),
            job_board_max_requests_per_minute: load_usize_with_minimum(
                "RAPIDAPI_MAX_REQUESTS_PER_MINUTE",
                3,
                1,
            ),
            max_jobs_to_index: load_usize_with_minimum("MAX_JOBS_TO_INDEX", 15, 10),
            default_location: load_env_optional("DEFAULT_JOB_LOCATION")
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            interview_questions: load_usize_with_minimum("INTERVIEW_QUESTIONS", 2, 1).min(10),
            enable_profile_pass2: load_bool("ENABLE_PROFILE_PASS2", false),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
            llm_endpoint,
            llm_api_key,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    load_env_optional(key).ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn load_usize_with_minimum(key: &str, default: usize, minimum: usize) -> usize {
    coerce_usize(load_env_optional(key).as_deref(), default, minimum)
}

fn load_seconds(key: &str, default: f64) -> Duration {
    coerce_seconds(load_env_optional(key).as_deref(), default)
}

fn load_bool(key: &str, default: bool) -> bool {
    coerce_bool(load_env_optional(key).as_deref(), default)
}

/// Parse a tuning knob, falling back to `default` when unparsable and raising it to `minimum`.
pub(crate) fn coerce_usize(raw: Option<&str>, default: usize, minimum: usize) -> usize {
    let value = raw
        .and_then(|value| value.trim().parse::<i64>().ok())
        .map(|value| value.max(0) as usize)
        .unwrap_or(default);
    value.max(minimum)
}

pub(crate) fn coerce_seconds(raw: Option<&str>, default: f64) -> Duration {
    let seconds = raw
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(default)
        .max(0.0);
    Duration::try_from_secs_f64(seconds)
        .or_else(|_| Duration::try_from_secs_f64(default))
        .unwrap_or(Duration::ZERO)
}

/// Retry count for completion calls, default 2, at most [`MAX_LLM_RETRIES`].
pub(crate) fn coerce_retries(raw: Option<&str>) -> u32 {
    let retries = coerce_usize(raw, 2, 0).min(MAX_LLM_RETRIES as usize);
    retries as u32
}

pub(crate) fn coerce_bool(raw: Option<&str>, default: bool) -> bool {
    match raw.map(|value| value.trim().to_lowercase()) {
        Some(value) => matches!(value.as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "azure" => Ok(Self::Azure),
            "openai" => Ok(Self::OpenAI),
            _ => Err(()),
        }
    }
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "azure" => Ok(Self::Azure),
            "openai" => Ok(Self::OpenAI),
            "hash" => Ok(Self::Hash),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        database = %config.database_path.display(),
        llm_provider = ?config.llm_provider,
        embedding_provider = ?config.embedding_provider,
        qdrant_url = %config.qdrant_url,
        collection = %config.qdrant_collection_name,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}

#[cfg(test)]
pub(crate) fn test_config(base_url: &str) -> Config {
    Config {
        database_path: PathBuf::from(":memory:"),
        llm_provider: LlmProvider::Azure,
        llm_endpoint: base_url.to_string(),
        llm_api_key: Some("test-key".into()),
        llm_deployment: "gpt-test".into(),
        llm_api_version: DEFAULT_LLM_API_VERSION.into(),
        llm_max_requests_per_minute: 60,
        llm_max_retries: 0,
        embedding_provider: EmbeddingProvider::Hash,
        embedding_model: "text-embedding-test".into(),
        embedding_dimension: 8,
        embedding_endpoint: base_url.to_string(),
        embedding_api_key: Some("test-key".into()),
        embedding_batch_size: 5,
        embedding_batch_delay: Duration::ZERO,
        qdrant_url: base_url.to_string(),
        qdrant_collection_name: "careerlens-test".into(),
        qdrant_api_key: None,
        job_board_url: base_url.to_string(),
        job_board_api_key: Some("rapid-key".into()),
        job_board_max_requests_per_minute: 60,
        max_jobs_to_index: 15,
        default_location: DEFAULT_LOCATION.into(),
        interview_questions: 2,
        enable_profile_pass2: false,
        server_port: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuning_knobs_fall_back_and_respect_minimums() {
        assert_eq!(coerce_usize(None, 20, 5), 20);
        assert_eq!(coerce_usize(Some("abc"), 20, 5), 20);
        assert_eq!(coerce_usize(Some("2"), 20, 5), 5);
        assert_eq!(coerce_usize(Some("-4"), 3, 1), 1);
        assert_eq!(coerce_usize(Some(" 40 "), 15, 10), 40);
    }

    #[test]
    fn batch_delay_parses_fractional_seconds() {
        assert_eq!(coerce_seconds(Some("0.5"), 0.2), Duration::from_millis(500));
        assert_eq!(coerce_seconds(Some("-1"), 0.2), Duration::ZERO);
        assert_eq!(coerce_seconds(Some("nan"), 0.2), Duration::from_millis(200));
        assert_eq!(coerce_seconds(Some("1e30"), 0.2), Duration::from_millis(200));
        assert_eq!(coerce_seconds(Some("inf"), 0.2), Duration::from_millis(200));
    }

    #[test]
    fn retry_count_is_capped() {
        assert_eq!(coerce_retries(None), 2);
        assert_eq!(coerce_retries(Some("0")), 0);
        assert_eq!(coerce_retries(Some("7")), 7);
        assert_eq!(coerce_retries(Some("40")), MAX_LLM_RETRIES);
        assert_eq!(coerce_retries(Some("99999999999")), MAX_LLM_RETRIES);
    }

    #[test]
    fn booleans_accept_common_spellings() {
        assert!(coerce_bool(Some("YES"), false));
        assert!(coerce_bool(Some("1"), false));
        assert!(!coerce_bool(Some("off"), true));
        assert!(coerce_bool(None, true));
    }

    #[test]
    fn search_modes_map_to_job_counts() {
        assert_eq!("deep".parse::<SearchMode>(), Ok(SearchMode::Deep));
        assert_eq!(SearchMode::Quick.job_count(), 15);
        assert_eq!(SearchMode::Standard.job_count(), 25);
        assert_eq!(SearchMode::Deep.job_count(), 40);
        assert!("turbo".parse::<SearchMode>().is_err());
    }
}
