//! RapidAPI LinkedIn job search client.

use super::normalize::{extract_items, normalize_jobs};
use super::{ConnectionStatus, JobBoard, JobBoardError, JobPosting};
use crate::config::{Config, get_config};
use crate::text::truncate_chars;
use crate::usage::RateLimiter;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

const SEARCH_PATH: &str = "active-jb-7d";
const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const ALTERNATIVE_LIMIT: usize = 10;
const ALTERNATIVE_TARGET: usize = 10;

/// Client for the RapidAPI LinkedIn job search API.
pub struct RapidApiJobBoard {
    pub(crate) client: Client,
    pub(crate) url: String,
    pub(crate) host: String,
    pub(crate) api_key: Option<String>,
    pub(crate) limiter: RateLimiter,
}

impl RapidApiJobBoard {
    /// Build a client from the global configuration.
    pub fn new() -> Result<Self, JobBoardError> {
        Self::from_config(get_config())
    }

    /// Build a client from an explicit configuration.
    pub fn from_config(config: &Config) -> Result<Self, JobBoardError> {
        let base = reqwest::Url::parse(&config.job_board_url)
            .map_err(|err| JobBoardError::InvalidUrl(err.to_string()))?;
        let host = base.host_str().unwrap_or_default().to_string();
        let url = format!(
            "{}/{SEARCH_PATH}",
            config.job_board_url.trim_end_matches('/')
        );
        let client = Client::builder()
            .user_agent(concat!("careerlens/", env!("CARGO_PKG_VERSION")))
            .build()?;

        tracing::debug!(
            url = %url,
            has_api_key = config.job_board_api_key.is_some(),
            max_per_minute = config.job_board_max_requests_per_minute,
            "Initialized job board client"
        );

        Ok(Self {
            client,
            url,
            host,
            api_key: config.job_board_api_key.clone(),
            limiter: RateLimiter::per_minute(config.job_board_max_requests_per_minute),
        })
    }

    async fn fetch(
        &self,
        title: &str,
        location: &str,
        limit: usize,
        timeout: Duration,
    ) -> Result<reqwest::Response, JobBoardError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(JobBoardError::MissingApiKey)?;

        self.limiter.wait_if_needed().await;

        let limit = limit.to_string();
        let title_filter = format!("\"{title}\"");
        let location_filter = format!("\"{location}\"");
        let response = self
            .client
            .get(&self.url)
            .timeout(timeout)
            .header("x-rapidapi-key", api_key)
            .header("x-rapidapi-host", &self.host)
            .query(&[
                ("limit", limit.as_str()),
                ("offset", "0"),
                ("title_filter", title_filter.as_str()),
                ("location_filter", location_filter.as_str()),
                ("description_type", "text"),
            ])
            .send()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl JobBoard for RapidApiJobBoard {
    async fn search_jobs(
        &self,
        keywords: &str,
        location: &str,
        limit: usize,
    ) -> Result<Vec<JobPosting>, JobBoardError> {
        let query = simplify_query(keywords);
        tracing::info!(
            original = keywords,
            simplified = %query,
            location,
            limit,
            "Searching job board"
        );

        let response = self.fetch(&query, location, limit, SEARCH_TIMEOUT).await?;
        match response.status() {
            StatusCode::FORBIDDEN => return Err(JobBoardError::Forbidden),
            StatusCode::TOO_MANY_REQUESTS => return Err(JobBoardError::RateLimited),
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(JobBoardError::UnexpectedStatus {
                    status: status.as_u16(),
                    body: truncate_chars(&body, 200).to_string(),
                });
            }
            _ => {}
        }

        let body: Value = response.json().await?;
        let jobs = normalize_jobs(extract_items(body));
        tracing::info!(count = jobs.len(), query = %query, "Retrieved postings");
        Ok(jobs)
    }

    async fn test_connection(&self) -> ConnectionStatus {
        let response = match self.fetch("Engineer", "Hong Kong", 5, PROBE_TIMEOUT).await {
            Ok(response) => response,
            Err(error) => {
                return ConnectionStatus {
                    ok: false,
                    status: None,
                    message: format!("Connection error: {error}"),
                };
            }
        };

        let status = response.status();
        let message = match status {
            StatusCode::OK => "API is working".to_string(),
            StatusCode::FORBIDDEN => "API key is invalid or expired (403 Forbidden)".to_string(),
            StatusCode::TOO_MANY_REQUESTS => {
                "Rate limit exceeded (429 Too Many Requests)".to_string()
            }
            other => format!("API returned status code {}", other.as_u16()),
        };
        ConnectionStatus {
            ok: status == StatusCode::OK,
            status: Some(status.as_u16()),
            message,
        }
    }
}

/// Reduce boolean or quoted queries to the first three plain words.
pub fn simplify_query(query: &str) -> String {
    query
        .replace(" OR ", " ")
        .replace(" AND ", " ")
        .replace(['(', ')', '"'], "")
        .split_whitespace()
        .take(3)
        .collect::<Vec<_>>()
        .join(" ")
}

fn alternative_queries(query: &str) -> Vec<String> {
    let first = query.split_whitespace().next().unwrap_or(query);
    vec![first.to_string(), "Manager".to_string(), "Analyst".to_string()]
}

/// Run a search and, when it comes back empty, broaden it with generic titles.
///
/// Errors from the primary search propagate; errors from the broadened searches are logged and
/// skipped.
pub async fn search_with_fallback(
    board: &(dyn JobBoard + Send + Sync),
    keywords: &str,
    location: &str,
    limit: usize,
) -> Result<Vec<JobPosting>, JobBoardError> {
    let mut jobs = board.search_jobs(keywords, location, limit).await?;
    if !jobs.is_empty() {
        return Ok(jobs);
    }

    let query = simplify_query(keywords);
    tracing::info!(query = %query, "No postings found; trying broader searches");
    for alternative in alternative_queries(&query) {
        match board
            .search_jobs(&alternative, location, ALTERNATIVE_LIMIT)
            .await
        {
            Ok(found) if !found.is_empty() => {
                tracing::info!(
                    alternative = %alternative,
                    count = found.len(),
                    "Broader search found postings"
                );
                jobs.extend(found);
                if jobs.len() >= ALTERNATIVE_TARGET {
                    break;
                }
            }
            Ok(_) => {}
            Err(error) => {
                tracing::warn!(alternative = %alternative, error = %error, "Broader search failed");
            }
        }
    }
    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};
    use serde_json::json;
    use std::sync::Mutex;

    fn board(server: &MockServer, api_key: Option<&str>) -> RapidApiJobBoard {
        RapidApiJobBoard {
            client: Client::new(),
            url: format!("{}/{SEARCH_PATH}", server.base_url()),
            host: "linkedin-job-search-api.p.rapidapi.com".into(),
            api_key: api_key.map(str::to_string),
            limiter: RateLimiter::per_minute(100),
        }
    }

    #[test]
    fn queries_are_simplified() {
        assert_eq!(
            simplify_query("(\"Data Analyst\" OR \"BI Developer\") AND SQL"),
            "Data Analyst BI"
        );
        assert_eq!(simplify_query("  Nurse "), "Nurse");
        assert_eq!(alternative_queries("Data Analyst BI")[0], "Data");
    }

    #[tokio::test]
    async fn search_sends_rapidapi_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/active-jb-7d")
                    .header("x-rapidapi-key", "rapid-key")
                    .header("x-rapidapi-host", "linkedin-job-search-api.p.rapidapi.com")
                    .query_param("limit", "15")
                    .query_param("offset", "0")
                    .query_param("title_filter", "\"Data Analyst\"")
                    .query_param("location_filter", "\"United States\"")
                    .query_param("description_type", "text");
                then.status(200).json_body(json!({
                    "data": [
                        { "id": "li-1", "title": "Data Analyst", "organization": "Acme" }
                    ]
                }));
            })
            .await;

        let jobs = board(&server, Some("rapid-key"))
            .search_jobs("\"Data Analyst\"", "United States", 15)
            .await
            .expect("search succeeds");
        mock.assert();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].company, "Acme");
    }

    #[tokio::test]
    async fn status_codes_map_to_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).query_param("title_filter", "\"Forbidden\"");
                then.status(403);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).query_param("title_filter", "\"Busy\"");
                then.status(429);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).query_param("title_filter", "\"Broken\"");
                then.status(500).body("upstream exploded");
            })
            .await;

        let board = board(&server, Some("rapid-key"));
        assert!(matches!(
            board.search_jobs("Forbidden", "US", 5).await,
            Err(JobBoardError::Forbidden)
        ));
        assert!(matches!(
            board.search_jobs("Busy", "US", 5).await,
            Err(JobBoardError::RateLimited)
        ));
        assert!(matches!(
            board.search_jobs("Broken", "US", 5).await,
            Err(JobBoardError::UnexpectedStatus { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).json_body(json!([]));
            })
            .await;

        let board = board(&server, None);
        assert!(matches!(
            board.search_jobs("Analyst", "US", 5).await,
            Err(JobBoardError::MissingApiKey)
        ));
        let status = board.test_connection().await;
        assert!(!status.ok);
        assert!(status.message.contains("RAPIDAPI_KEY"));
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn connection_probe_reports_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .query_param("limit", "5")
                    .query_param("title_filter", "\"Engineer\"")
                    .query_param("location_filter", "\"Hong Kong\"");
                then.status(200).json_body(json!([]));
            })
            .await;

        let status = board(&server, Some("rapid-key")).test_connection().await;
        assert_eq!(
            status,
            ConnectionStatus {
                ok: true,
                status: Some(200),
                message: "API is working".into()
            }
        );
    }

    struct ScriptedBoard {
        results: Mutex<Vec<Result<Vec<JobPosting>, JobBoardError>>>,
        queries: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl JobBoard for ScriptedBoard {
        async fn search_jobs(
            &self,
            keywords: &str,
            _location: &str,
            limit: usize,
        ) -> Result<Vec<JobPosting>, JobBoardError> {
            self.queries
                .lock()
                .unwrap()
                .push((keywords.to_string(), limit));
            self.results.lock().unwrap().remove(0)
        }

        async fn test_connection(&self) -> ConnectionStatus {
            unreachable!()
        }
    }

    fn postings(count: usize) -> Vec<JobPosting> {
        (0..count)
            .map(|n| JobPosting {
                id: format!("job-{n}"),
                ..JobPosting::default()
            })
            .collect()
    }

    #[tokio::test]
    async fn empty_search_falls_back_to_broader_titles() {
        let board = ScriptedBoard {
            results: Mutex::new(vec![
                Ok(vec![]),
                Err(JobBoardError::RateLimited),
                Ok(postings(6)),
                Ok(postings(6)),
                Ok(postings(1)),
            ]),
            queries: Mutex::new(Vec::new()),
        };

        let jobs = search_with_fallback(&board, "Marine Biologist", "US", 25)
            .await
            .expect("fallback search");
        assert_eq!(jobs.len(), 12);

        let queries = board.queries.lock().unwrap().clone();
        assert_eq!(
            queries,
            vec![
                ("Marine Biologist".to_string(), 25),
                ("Marine".to_string(), 10),
                ("Manager".to_string(), 10),
                ("Analyst".to_string(), 10),
            ]
        );
    }

    #[tokio::test]
    async fn primary_errors_propagate() {
        let board = ScriptedBoard {
            results: Mutex::new(vec![Err(JobBoardError::Forbidden)]),
            queries: Mutex::new(Vec::new()),
        };
        let result = search_with_fallback(&board, "Analyst", "US", 15).await;
        assert!(matches!(result, Err(JobBoardError::Forbidden)));
    }
}
